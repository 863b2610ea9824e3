use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Power-score model knobs. The defaults reproduce the published rating
/// formula; everything here is a tunable, not a law.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerConfig {
    pub rank_base: f64,
    pub rank_penalty: f64,
    pub ppg_scale: f64,
    pub gdpg_scale: f64,
    pub home_bonus: f64,
    pub max_power: u32,
    /// Delta beyond which a side is a strong favourite.
    pub strong_delta: i64,
    /// Delta beyond which a side is a moderate favourite.
    pub moderate_delta: i64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            rank_base: 100.0,
            rank_penalty: 3.0,
            ppg_scale: 10.0,
            gdpg_scale: 5.0,
            home_bonus: 10.0,
            max_power: 200,
            strong_delta: 30,
            moderate_delta: 15,
        }
    }
}

/// Recent-form correction: window score (3 per win, 1 per draw) bucketed
/// into five tiers. `tier_bounds` are the lower bounds of tiers 2..=5.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FormConfig {
    pub window: usize,
    pub tier_bounds: [u32; 4],
    pub tier_factors: [f64; 5],
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            window: 5,
            tier_bounds: [4, 7, 10, 13],
            tier_factors: [0.90, 0.95, 1.00, 1.05, 1.10],
        }
    }
}

/// Injury-impact tables. Per-injury impact is role weight x severity
/// multiplier x importance multiplier; the summed impact is capped so the
/// correction never drops below 1 - `impact_cap`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InjuryConfig {
    pub goalkeeper_weight: f64,
    pub defender_weight: f64,
    pub midfielder_weight: f64,
    pub forward_weight: f64,
    pub minor_multiplier: f64,
    pub moderate_multiplier: f64,
    pub severe_multiplier: f64,
    pub rotation_multiplier: f64,
    pub regular_multiplier: f64,
    pub key_player_multiplier: f64,
    pub impact_cap: f64,
}

impl Default for InjuryConfig {
    fn default() -> Self {
        Self {
            goalkeeper_weight: 0.18,
            defender_weight: 0.10,
            midfielder_weight: 0.12,
            forward_weight: 0.15,
            minor_multiplier: 0.30,
            moderate_multiplier: 0.60,
            severe_multiplier: 1.00,
            rotation_multiplier: 0.50,
            regular_multiplier: 0.80,
            key_player_multiplier: 1.20,
            impact_cap: 0.60,
        }
    }
}

/// Context-adjustment thresholds and factors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdjustConfig {
    /// Net correction above which the goal margin shrinks hard.
    pub strong_threshold: f64,
    /// Net correction above which the goal margin shrinks mildly.
    pub mild_threshold: f64,
    /// Net correction below which (net positive context) the margin amplifies.
    pub positive_threshold: f64,
    pub strong_shrink: f64,
    pub mild_shrink: f64,
    pub amplify: f64,
    pub exact_alignment: f64,
    pub class_alignment: f64,
    pub mismatch_alignment: f64,
    pub max_goals: u8,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            strong_threshold: 0.30,
            mild_threshold: 0.10,
            positive_threshold: -0.10,
            strong_shrink: 0.70,
            mild_shrink: 0.85,
            amplify: 1.15,
            exact_alignment: 1.5,
            class_alignment: 1.2,
            mismatch_alignment: 0.8,
            max_goals: 5,
        }
    }
}

/// Score-distribution multipliers and clamp band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Bucket edges over the power differential, ascending. Six edges split
    /// the axis into seven buckets from very-strong-away to very-strong-home.
    pub bucket_edges: [i64; 6],
    pub align_boost: f64,
    pub align_penalty: f64,
    /// Per-goal penalty applied to the injured side's goals, per point of
    /// injury score beyond neutral.
    pub injury_goal_penalty: f64,
    pub form_swing: f64,
    pub pressure_boost: f64,
    pub prob_floor: f64,
    pub prob_ceil: f64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            bucket_edges: [-45, -25, -10, 10, 25, 45],
            align_boost: 1.15,
            align_penalty: 0.85,
            injury_goal_penalty: 0.04,
            form_swing: 0.15,
            pressure_boost: 0.05,
            prob_floor: 0.01,
            prob_ceil: 0.95,
        }
    }
}

/// Fusion weights and case-based override gates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionConfig {
    pub oracle_base_weight: f64,
    /// Extra oracle weight at 100 base confidence.
    pub oracle_confidence_span: f64,
    pub simulation_weight: f64,
    pub context_weight: f64,
    pub outlier_confidence_gate: u8,
    pub outlier_probability_gate: f64,
    pub red_card_shrink: f64,
    pub weather_shrink: f64,
    pub injury_shrink: f64,
    pub default_shrink: f64,
    pub draw_probability_gate: f64,
    /// Base-model share in the high-risk dampening blend.
    pub risk_base_share: f64,
    pub risk_goal_cap: u8,
    pub max_goals: u8,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            oracle_base_weight: 0.20,
            oracle_confidence_span: 0.20,
            simulation_weight: 0.30,
            context_weight: 0.30,
            outlier_confidence_gate: 80,
            outlier_probability_gate: 0.30,
            red_card_shrink: 0.70,
            weather_shrink: 0.60,
            injury_shrink: 0.80,
            default_shrink: 0.80,
            draw_probability_gate: 0.40,
            risk_base_share: 0.75,
            risk_goal_cap: 3,
            max_goals: 5,
        }
    }
}

/// Staking knobs: quarter Kelly with confidence and value-edge scaling,
/// clamped to a [0.5%, 5%] bankroll band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StakingConfig {
    pub kelly_multiplier: f64,
    pub min_stake: f64,
    pub max_stake: f64,
    pub edge_multiplier_scale: f64,
    pub edge_multiplier_cap: f64,
    /// Minimum acceptable sum of the three outcome probabilities.
    pub min_probability_sum: f64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            kelly_multiplier: 0.25,
            min_stake: 0.005,
            max_stake: 0.05,
            edge_multiplier_scale: 2.0,
            edge_multiplier_cap: 1.5,
            min_probability_sum: 0.95,
        }
    }
}

/// Every tunable of the prediction and staking pipeline in one place.
/// All values are configuration defaults, not normative constants; callers
/// may persist an edited copy as JSON and reload it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub power: PowerConfig,
    pub form: FormConfig,
    pub injury: InjuryConfig,
    pub adjust: AdjustConfig,
    pub distribution: DistributionConfig,
    pub fusion: FusionConfig,
    pub staking: StakingConfig,
}

static DEFAULT_CONFIG: Lazy<ModelConfig> = Lazy::new(ModelConfig::default);

impl ModelConfig {
    /// Shared default configuration for callers that never tune anything.
    pub fn shared() -> &'static ModelConfig {
        &DEFAULT_CONFIG
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read model config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parse model config {}", path.display()))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize model config")?;
        fs::write(&tmp, json).with_context(|| format!("write model config {}", tmp.display()))?;
        fs::rename(&tmp, path).context("swap model config")?;
        Ok(())
    }
}
