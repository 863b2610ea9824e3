use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::DistributionConfig;
use crate::context::{ContextFactor, FactorKind, weighted_score};
use crate::scoreline::Scoreline;

/// Candidate scorelines per power-differential bucket, very-strong-away
/// first. Priors within a row sum to 1.0 before context weighting.
const CANDIDATES: [[(u8, u8); 5]; 7] = [
    [(0, 3), (0, 2), (1, 3), (0, 4), (1, 2)],
    [(0, 2), (1, 2), (0, 1), (1, 3), (0, 3)],
    [(0, 1), (1, 2), (1, 1), (0, 2), (2, 2)],
    [(1, 1), (1, 0), (0, 1), (2, 1), (1, 2)],
    [(1, 0), (2, 1), (1, 1), (2, 0), (2, 2)],
    [(2, 0), (2, 1), (1, 0), (3, 1), (3, 0)],
    [(3, 0), (2, 0), (3, 1), (4, 0), (2, 1)],
];

const PRIORS: [[f64; 5]; 7] = [
    [0.28, 0.22, 0.18, 0.17, 0.15],
    [0.26, 0.22, 0.20, 0.17, 0.15],
    [0.24, 0.22, 0.20, 0.18, 0.16],
    [0.26, 0.20, 0.20, 0.17, 0.17],
    [0.24, 0.22, 0.20, 0.18, 0.16],
    [0.26, 0.22, 0.20, 0.17, 0.15],
    [0.28, 0.22, 0.18, 0.17, 0.15],
];

/// Normalized probability distribution over candidate scorelines.
/// Probabilities sum to 1.0 within float tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    entries: BTreeMap<Scoreline, f64>,
    most_likely: Scoreline,
}

impl ScoreDistribution {
    pub fn probability(&self, scoreline: Scoreline) -> f64 {
        self.entries.get(&scoreline).copied().unwrap_or(0.0)
    }

    pub fn most_likely(&self) -> Scoreline {
        self.most_likely
    }

    pub fn iter(&self) -> impl Iterator<Item = (Scoreline, f64)> + '_ {
        self.entries.iter().map(|(s, p)| (*s, *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.entries.values().sum()
    }
}

/// Builds the scoreline distribution for a fixture from the power
/// differential and its weighted context factors.
///
/// Each candidate's prior is reweighted by four multipliers (power
/// alignment, injuries, morale, pressure), clamped to the configured band
/// and normalized so the distribution sums to 1.
pub fn distribute(
    power_diff: i64,
    factors: &[ContextFactor],
    cfg: &DistributionConfig,
) -> ScoreDistribution {
    let bucket = cfg.bucket_edges.iter().filter(|e| power_diff > **e).count();
    let candidates = &CANDIDATES[bucket];
    let priors = &PRIORS[bucket];

    let injury_score = weighted_score(factors, FactorKind::Injuries);
    let form_score = weighted_score(factors, FactorKind::TeamMorale);
    let pressure_score = weighted_score(factors, FactorKind::Pressure);

    let mut weighted = [0.0_f64; 5];
    for (i, &(home, away)) in candidates.iter().enumerate() {
        let candidate = Scoreline::new(home, away);
        let p = priors[i]
            * power_alignment(candidate, power_diff, cfg)
            * injury_multiplier(candidate, injury_score, cfg)
            * form_multiplier(candidate, form_score, cfg)
            * pressure_multiplier(candidate, pressure_score, cfg);
        weighted[i] = p.clamp(cfg.prob_floor, cfg.prob_ceil);
    }

    let sum: f64 = weighted.iter().sum();
    let sum = sum.max(1e-12);

    let mut entries = BTreeMap::new();
    let mut most_likely = Scoreline::new(candidates[0].0, candidates[0].1);
    let mut best = f64::MIN;
    for (i, &(home, away)) in candidates.iter().enumerate() {
        let p = weighted[i] / sum;
        entries.insert(Scoreline::new(home, away), p);
        // Strict comparison keeps the first candidate on ties.
        if p > best {
            best = p;
            most_likely = Scoreline::new(home, away);
        }
    }

    ScoreDistribution {
        entries,
        most_likely,
    }
}

/// Rewards candidates whose goal-difference sign matches the power
/// differential, penalizes the opposite sign.
fn power_alignment(candidate: Scoreline, power_diff: i64, cfg: &DistributionConfig) -> f64 {
    let gd = candidate.goal_diff();
    if gd == 0 || power_diff == 0 {
        1.0
    } else if (gd > 0) == (power_diff > 0) {
        cfg.align_boost
    } else {
        cfg.align_penalty
    }
}

/// Penalizes goals for the side carrying the injury load (home above
/// neutral, away below).
fn injury_multiplier(candidate: Scoreline, injury_score: f64, cfg: &DistributionConfig) -> f64 {
    let mult = if injury_score > 5.0 {
        1.0 - (injury_score - 5.0) / 5.0 * cfg.injury_goal_penalty * candidate.home as f64
    } else {
        1.0 - (5.0 - injury_score) / 5.0 * cfg.injury_goal_penalty * candidate.away as f64
    };
    mult.max(0.70)
}

/// Swings the goal-difference sign with the morale balance.
fn form_multiplier(candidate: Scoreline, form_score: f64, cfg: &DistributionConfig) -> f64 {
    let gd = candidate.goal_diff();
    if gd == 0 {
        return 1.0;
    }
    let swing = (form_score - 5.0) / 5.0 * cfg.form_swing;
    if gd > 0 { 1.0 + swing } else { 1.0 - swing }
}

/// Big-match pressure lifts home-goal candidates.
fn pressure_multiplier(candidate: Scoreline, pressure_score: f64, cfg: &DistributionConfig) -> f64 {
    let goals = (candidate.home as f64).min(3.0);
    let mult = 1.0 + (pressure_score - 5.0) / 5.0 * cfg.pressure_boost * goals;
    mult.max(0.80)
}
