use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AdjustConfig;
use crate::context::{ContextFactor, FactorKind, weighted_score};
use crate::power::BasePrediction;
use crate::scoreline::{Scoreline, SimulationResult};

/// What the margin step did, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginAction {
    StrongShrink,
    MildShrink,
    Amplify,
    Unchanged,
}

/// Structured record of which adjustments fired and with what values.
/// This is the non-normative annotation the pipeline exposes instead of
/// prose reasoning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentTrace {
    pub injury_signal: f64,
    pub form_signal: f64,
    pub pressure_signal: f64,
    /// Net correction re-signed against the predicted favourite.
    pub against_favourite: f64,
    pub margin_action: MarginAction,
    pub alignment: f64,
    pub draw_pull: bool,
}

/// Base prediction after context corrections. A new object every time;
/// the base prediction is never edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedPrediction {
    pub scoreline: Scoreline,
    pub confidence: u8,
    pub trace: AdjustmentTrace,
}

/// Applies injury, morale and pressure context plus a simulation-alignment
/// factor to the base prediction.
///
/// Factor scores are home-relative (5 neutral). The injury/form/pressure
/// signals combine into one net correction which is then read against the
/// predicted favourite: context working against the favourite shrinks the
/// goal margin, context in its favour amplifies it.
pub fn adjust(
    base: &BasePrediction,
    factors: &[ContextFactor],
    simulation: Option<&SimulationResult>,
    cfg: &AdjustConfig,
) -> AdjustedPrediction {
    let injury_score = weighted_score(factors, FactorKind::Injuries);
    let form_score = weighted_score(factors, FactorKind::TeamMorale);
    let pressure_score = weighted_score(factors, FactorKind::Pressure);

    // Positive signal = works against the home side.
    let injury_signal = (injury_score - 5.0) / 5.0 * 0.30;
    let form_signal = -(form_score - 5.0) / 5.0 * 0.10;
    let pressure_signal = (pressure_score - 5.0) / 5.0 * 0.10;
    let net = injury_signal + form_signal + pressure_signal;

    let gd = base.scoreline.goal_diff();
    let against_favourite = if gd < 0 { -net } else { net };

    let (multiplier, margin_action) = if against_favourite > cfg.strong_threshold {
        (cfg.strong_shrink, MarginAction::StrongShrink)
    } else if against_favourite > cfg.mild_threshold {
        (cfg.mild_shrink, MarginAction::MildShrink)
    } else if against_favourite < cfg.positive_threshold {
        (cfg.amplify, MarginAction::Amplify)
    } else {
        (1.0, MarginAction::Unchanged)
    };

    let alignment = alignment_factor(base, simulation, cfg);
    let draw_pull = alignment < 1.0 && gd != 0;

    let mut new_gd = (gd as f64 * multiplier).round() as i32;
    if draw_pull {
        // Disagreement with the simulation pulls the margin one goal
        // toward a draw.
        new_gd -= new_gd.signum();
    }

    let scoreline = rebuild_scoreline(base.scoreline, new_gd, cfg.max_goals);

    let injury_loss = injury_signal.abs();
    let form_against = if gd < 0 { -form_signal } else { form_signal };
    let form_loss = form_against.max(0.0);
    let confidence = (base.confidence as f64 * (1.0 - injury_loss) * (1.0 - form_loss) * alignment)
        .clamp(0.0, 100.0)
        .round() as u8;

    debug!(
        injury_signal,
        form_signal,
        pressure_signal,
        against_favourite,
        alignment,
        %scoreline,
        confidence,
        "context adjustment"
    );

    AdjustedPrediction {
        scoreline,
        confidence,
        trace: AdjustmentTrace {
            injury_signal,
            form_signal,
            pressure_signal,
            against_favourite,
            margin_action,
            alignment,
            draw_pull,
        },
    }
}

/// Agreement factor between the base prediction and the independent
/// simulation, in [mismatch, exact].
fn alignment_factor(
    base: &BasePrediction,
    simulation: Option<&SimulationResult>,
    cfg: &AdjustConfig,
) -> f64 {
    let Some(sim) = simulation else {
        return 1.0;
    };
    if sim.most_likely == base.scoreline {
        cfg.exact_alignment
    } else if sim.most_likely.outcome() == base.scoreline.outcome() {
        cfg.class_alignment
    } else {
        cfg.mismatch_alignment
    }
}

/// Keeps the weaker side's goals fixed and rebuilds the margin around them,
/// clamping every goal count to [0, max_goals].
fn rebuild_scoreline(base: Scoreline, new_gd: i32, max_goals: u8) -> Scoreline {
    let max = max_goals as i32;
    let (home, away) = if new_gd >= 0 {
        let anchor = (base.away as i32).min(max);
        ((anchor + new_gd).clamp(0, max), anchor)
    } else {
        let anchor = (base.home as i32).min(max);
        (anchor, (anchor - new_gd).clamp(0, max))
    };
    Scoreline::new(home as u8, away as u8)
}
