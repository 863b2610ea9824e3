use serde::{Deserialize, Serialize};

use crate::config::{FormConfig, InjuryConfig};

/// One entry of a team's recent-results list, most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecentResult {
    Win,
    Draw,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRole {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjurySeverity {
    Minor,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerImportance {
    Rotation,
    Regular,
    KeyPlayer,
}

/// One reported injury. Player identity is irrelevant to the model; only
/// role, severity and squad importance carry signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInjury {
    pub role: PlayerRole,
    pub severity: InjurySeverity,
    pub importance: PlayerImportance,
}

/// Multiplicative form factor from the last `window` results.
///
/// Window score is 3 per win and 1 per draw, bucketed into five tiers.
/// An empty list is a missing-data fallback and yields exactly 1.0.
pub fn form_correction(results: &[RecentResult], cfg: &FormConfig) -> f64 {
    if results.is_empty() {
        return 1.0;
    }

    let score: u32 = results
        .iter()
        .take(cfg.window)
        .map(|r| match r {
            RecentResult::Win => 3,
            RecentResult::Draw => 1,
            RecentResult::Loss => 0,
        })
        .sum();

    let tier = cfg.tier_bounds.iter().filter(|b| score >= **b).count();
    cfg.tier_factors[tier]
}

/// Multiplicative strength factor in [1 - cap, 1.0] from an injury list.
///
/// Impact per injury is role weight x severity multiplier x importance
/// multiplier; impacts sum (order-independent) and are capped before the
/// factor is formed. An empty list yields exactly 1.0.
pub fn injury_correction(injuries: &[PlayerInjury], cfg: &InjuryConfig) -> f64 {
    let total: f64 = injuries.iter().map(|i| injury_impact(i, cfg)).sum();
    1.0 - total.min(cfg.impact_cap)
}

pub fn injury_impact(injury: &PlayerInjury, cfg: &InjuryConfig) -> f64 {
    let role = match injury.role {
        PlayerRole::Goalkeeper => cfg.goalkeeper_weight,
        PlayerRole::Defender => cfg.defender_weight,
        PlayerRole::Midfielder => cfg.midfielder_weight,
        PlayerRole::Forward => cfg.forward_weight,
    };
    let severity = match injury.severity {
        InjurySeverity::Minor => cfg.minor_multiplier,
        InjurySeverity::Moderate => cfg.moderate_multiplier,
        InjurySeverity::Severe => cfg.severe_multiplier,
    };
    let importance = match injury.importance {
        PlayerImportance::Rotation => cfg.rotation_multiplier,
        PlayerImportance::Regular => cfg.regular_multiplier,
        PlayerImportance::KeyPlayer => cfg.key_player_multiplier,
    };
    role * severity * importance
}
