use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FusionConfig;
use crate::context::{ContextEnhancement, OutlierKind, RiskLevel};
use crate::power::BasePrediction;
use crate::scoreline::{Outcome, OutcomeProbs, Scoreline, SimulationResult};

/// Fusion weights over the three sources. Non-negative, summing to 1.0;
/// an absent source holds weight 0 and its share is redistributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub oracle: f64,
    pub simulation: f64,
    pub context: f64,
}

impl FusionWeights {
    pub fn sum(&self) -> f64 {
        self.oracle + self.simulation + self.context
    }
}

/// Which source dominated the final prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionSource {
    Oracle,
    Simulation,
    Context,
    Hybrid,
}

/// Case-based override rules, highest priority first. First match wins;
/// the default weighted blend always matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FusionRule {
    OutlierDominance,
    DrawBias,
    RiskDampening,
    WeightedBlend,
}

impl FusionRule {
    pub const ORDERED: [FusionRule; 4] = [
        FusionRule::OutlierDominance,
        FusionRule::DrawBias,
        FusionRule::RiskDampening,
        FusionRule::WeightedBlend,
    ];

    pub fn applies(self, inputs: &FusionInputs<'_>) -> bool {
        match self {
            FusionRule::OutlierDominance => {
                inputs.base.confidence > inputs.cfg.outlier_confidence_gate
                    && inputs
                        .enhancement
                        .is_some_and(|e| e.dominant_outlier(inputs.cfg.outlier_probability_gate).is_some())
            }
            FusionRule::DrawBias => inputs
                .simulation
                .is_some_and(|s| s.probs.normalized().draw > inputs.cfg.draw_probability_gate),
            FusionRule::RiskDampening => inputs
                .enhancement
                .is_some_and(|e| e.risk_level() >= RiskLevel::High),
            FusionRule::WeightedBlend => true,
        }
    }

    pub fn resolve(self, inputs: &FusionInputs<'_>) -> Scoreline {
        let cfg = inputs.cfg;
        let base = inputs.base.scoreline;
        match self {
            FusionRule::OutlierDominance => {
                let Some(outlier) = inputs
                    .enhancement
                    .and_then(|e| e.dominant_outlier(cfg.outlier_probability_gate))
                else {
                    return base;
                };
                let shrink = match outlier.kind() {
                    OutlierKind::RedCard => cfg.red_card_shrink,
                    OutlierKind::Weather => cfg.weather_shrink,
                    OutlierKind::Injury => cfg.injury_shrink,
                    OutlierKind::Other => cfg.default_shrink,
                };
                scale_scoreline(base, shrink, cfg.max_goals)
            }
            FusionRule::DrawBias => {
                let mean = (base.home as f64 + base.away as f64) / 2.0;
                if (base.home as i32 - base.away as i32).abs() <= 1 {
                    let g = mean.floor() as u8;
                    Scoreline::new(g, g)
                } else if base.home > base.away {
                    Scoreline::new(mean.ceil() as u8, mean.floor() as u8)
                } else {
                    Scoreline::new(mean.floor() as u8, mean.ceil() as u8)
                }
            }
            FusionRule::RiskDampening => {
                let (sh, sa) = inputs
                    .simulation
                    .map(|s| (s.most_likely.home, s.most_likely.away))
                    .unwrap_or((base.home, base.away));
                let share = cfg.risk_base_share;
                let home = share * base.home as f64 + (1.0 - share) * sh as f64;
                let away = share * base.away as f64 + (1.0 - share) * sa as f64;
                Scoreline::new(
                    (home.round() as u8).min(cfg.risk_goal_cap),
                    (away.round() as u8).min(cfg.risk_goal_cap),
                )
            }
            FusionRule::WeightedBlend => {
                let Some(sim) = inputs.simulation else {
                    return base;
                };
                let denom = (inputs.weights.oracle + inputs.weights.simulation).max(1e-12);
                let wo = inputs.weights.oracle / denom;
                let ws = inputs.weights.simulation / denom;
                let home = wo * base.home as f64 + ws * sim.most_likely.home as f64;
                let away = wo * base.away as f64 + ws * sim.most_likely.away as f64;
                Scoreline::new(
                    (home.round() as u8).min(cfg.max_goals),
                    (away.round() as u8).min(cfg.max_goals),
                )
            }
        }
    }
}

/// Everything a fusion rule may look at.
pub struct FusionInputs<'a> {
    pub base: &'a BasePrediction,
    pub simulation: Option<&'a SimulationResult>,
    pub enhancement: Option<&'a ContextEnhancement>,
    pub weights: FusionWeights,
    pub cfg: &'a FusionConfig,
}

/// The fused prediction handed to the staking engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalPrediction {
    pub scoreline: Scoreline,
    pub confidence: u8,
    pub primary_source: PredictionSource,
    pub probs: OutcomeProbs,
    pub rule: FusionRule,
}

/// Fuses the deterministic base model with the optional simulation and
/// context enhancement. Absent sources degrade to neutral weights; the
/// base prediction alone is always enough to produce a result.
pub fn fuse(
    base: &BasePrediction,
    simulation: Option<&SimulationResult>,
    enhancement: Option<&ContextEnhancement>,
    cfg: &FusionConfig,
) -> FinalPrediction {
    let weights = compute_weights(base, simulation.is_some(), enhancement.is_some(), cfg);
    let inputs = FusionInputs {
        base,
        simulation,
        enhancement,
        weights,
        cfg,
    };

    let rule = FusionRule::ORDERED
        .iter()
        .copied()
        .find(|r| r.applies(&inputs))
        .unwrap_or(FusionRule::WeightedBlend);
    let scoreline = rule.resolve(&inputs);

    let oracle_conf = base.confidence as f64;
    let sim_conf = simulation.map(|s| s.probs.normalized().max_prob() * 100.0);
    let ctx_conf = enhancement.map(|e| context_confidence(e.risk_level()));

    let confidence = (weights.oracle * oracle_conf
        + weights.simulation * sim_conf.unwrap_or(0.0)
        + weights.context * ctx_conf.unwrap_or(0.0))
    .clamp(0.0, 100.0)
    .round() as u8;

    let probs = fused_probs(base, simulation, &weights);
    let primary_source = primary_source(&weights, oracle_conf, sim_conf, ctx_conf);

    debug!(
        ?rule,
        ?primary_source,
        oracle_weight = weights.oracle,
        simulation_weight = weights.simulation,
        context_weight = weights.context,
        %scoreline,
        confidence,
        "fusion"
    );

    FinalPrediction {
        scoreline,
        confidence,
        primary_source,
        probs,
        rule,
    }
}

/// Raw weights (oracle scaled by base confidence, fixed shares for the
/// other sources) renormalized over whichever sources are present.
pub fn compute_weights(
    base: &BasePrediction,
    has_simulation: bool,
    has_enhancement: bool,
    cfg: &FusionConfig,
) -> FusionWeights {
    let oracle =
        cfg.oracle_base_weight + cfg.oracle_confidence_span * (base.confidence as f64 / 100.0);
    let simulation = if has_simulation { cfg.simulation_weight } else { 0.0 };
    let context = if has_enhancement { cfg.context_weight } else { 0.0 };

    let sum = (oracle + simulation + context).max(1e-12);
    FusionWeights {
        oracle: oracle / sum,
        simulation: simulation / sum,
        context: context / sum,
    }
}

fn context_confidence(risk: RiskLevel) -> f64 {
    match risk {
        RiskLevel::Low => 80.0,
        RiskLevel::Medium => 60.0,
        RiskLevel::High => 40.0,
        RiskLevel::VeryHigh => 20.0,
    }
}

/// Outcome probabilities implied by the deterministic oracle: confidence
/// mass on the predicted class, remainder split with a draw lean.
fn oracle_implied_probs(base: &BasePrediction) -> OutcomeProbs {
    let mass = (base.confidence as f64 / 100.0).clamp(0.34, 0.90);
    let rest = 1.0 - mass;
    match base.scoreline.outcome() {
        Outcome::Home => OutcomeProbs::new(mass, rest * 0.6, rest * 0.4),
        Outcome::Away => OutcomeProbs::new(rest * 0.4, rest * 0.6, mass),
        Outcome::Draw => OutcomeProbs::new(rest / 2.0, mass, rest / 2.0),
    }
}

fn fused_probs(
    base: &BasePrediction,
    simulation: Option<&SimulationResult>,
    weights: &FusionWeights,
) -> OutcomeProbs {
    let oracle = oracle_implied_probs(base);
    let Some(sim) = simulation else {
        return oracle.normalized();
    };
    let sim_probs = sim.probs.normalized();
    let denom = (weights.oracle + weights.simulation).max(1e-12);
    let wo = weights.oracle / denom;
    let ws = weights.simulation / denom;
    OutcomeProbs::new(
        wo * oracle.home + ws * sim_probs.home,
        wo * oracle.draw + ws * sim_probs.draw,
        wo * oracle.away + ws * sim_probs.away,
    )
    .normalized()
}

/// A source with a majority weight owns the prediction; otherwise the
/// strongest standalone confidence signal does; a dead heat is a hybrid.
fn primary_source(
    weights: &FusionWeights,
    oracle_conf: f64,
    sim_conf: Option<f64>,
    ctx_conf: Option<f64>,
) -> PredictionSource {
    if weights.oracle >= 0.5 {
        return PredictionSource::Oracle;
    }
    if weights.simulation >= 0.5 {
        return PredictionSource::Simulation;
    }
    if weights.context >= 0.5 {
        return PredictionSource::Context;
    }

    let mut candidates = vec![(PredictionSource::Oracle, oracle_conf)];
    if let Some(c) = sim_conf {
        candidates.push((PredictionSource::Simulation, c));
    }
    if let Some(c) = ctx_conf {
        candidates.push((PredictionSource::Context, c));
    }

    let best = candidates
        .iter()
        .map(|(_, c)| *c)
        .fold(f64::MIN, f64::max);
    let mut leaders = candidates.iter().filter(|(_, c)| *c >= best - 1e-9);
    match (leaders.next(), leaders.next()) {
        (Some((source, _)), None) => *source,
        _ => PredictionSource::Hybrid,
    }
}

fn scale_scoreline(s: Scoreline, factor: f64, max_goals: u8) -> Scoreline {
    Scoreline::new(
        ((s.home as f64 * factor).round() as u8).min(max_goals),
        ((s.away as f64 * factor).round() as u8).min(max_goals),
    )
}
