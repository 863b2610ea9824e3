use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adjust::{AdjustedPrediction, adjust};
use crate::config::ModelConfig;
use crate::context::{ContextEnhancement, ContextFactor, FactorKind};
use crate::corrections::{PlayerInjury, RecentResult, form_correction, injury_correction};
use crate::distribution::{ScoreDistribution, distribute};
use crate::error::ModelError;
use crate::fusion::{FinalPrediction, fuse};
use crate::power::{BasePrediction, compute_base};
use crate::scoreline::SimulationResult;
use crate::staking::{KellyResult, OddsQuote, stake};
use crate::standings::TeamStanding;

/// Everything the external collaborators hand over for one fixture.
/// Standings may be absent (synthetic mid-table fallback); the context
/// enhancement is deliberately NOT part of this snapshot — it arrives
/// separately, possibly late, possibly never.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureData {
    pub fixture_id: String,
    pub home_standing: Option<TeamStanding>,
    pub away_standing: Option<TeamStanding>,
    pub source_quality: f64,
    pub home_results: Vec<RecentResult>,
    pub away_results: Vec<RecentResult>,
    pub home_injuries: Vec<PlayerInjury>,
    pub away_injuries: Vec<PlayerInjury>,
    pub factors: Vec<ContextFactor>,
    pub simulation: Option<SimulationResult>,
    pub odds: Option<OddsQuote>,
    pub closing_odds: Option<OddsQuote>,
}

impl FixtureData {
    pub fn new(fixture_id: impl Into<String>) -> Self {
        Self {
            fixture_id: fixture_id.into(),
            home_standing: None,
            away_standing: None,
            source_quality: 1.0,
            home_results: Vec::new(),
            away_results: Vec::new(),
            home_injuries: Vec::new(),
            away_injuries: Vec::new(),
            factors: Vec::new(),
            simulation: None,
            odds: None,
            closing_odds: None,
        }
    }
}

/// Immutable bundle of every stage output for one fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureReport {
    pub fixture_id: String,
    pub base: BasePrediction,
    pub adjusted: AdjustedPrediction,
    pub distribution: ScoreDistribution,
    pub fused: FinalPrediction,
    pub staking: Option<KellyResult>,
    pub generated_at: DateTime<Utc>,
}

/// Synchronous orchestration of the prediction stages.
///
/// `base` never looks at a context enhancement, so the base prediction is
/// always available first; `refine` takes the enhancement as an `Option`
/// and treats a failed or timed-out lookup (`None`) as neutral input. A
/// late enhancement therefore refines, and can never invalidate, an
/// already-delivered base prediction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    config: ModelConfig,
}

impl Pipeline {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Deterministic base prediction from standings alone.
    pub fn base(&self, data: &FixtureData) -> Result<BasePrediction, ModelError> {
        let home = data
            .home_standing
            .unwrap_or_else(TeamStanding::synthetic_mid_table);
        let away = data
            .away_standing
            .unwrap_or_else(TeamStanding::synthetic_mid_table);
        if data.home_standing.is_none() || data.away_standing.is_none() {
            debug!(fixture = %data.fixture_id, "standings missing, using mid-table fallback");
        }
        compute_base(&home, &away, data.source_quality, &self.config.power)
    }

    /// Runs every downstream stage over an already-computed base
    /// prediction. Pass `None` for a missing, failed or cancelled
    /// enhancement lookup.
    pub fn refine(
        &self,
        data: &FixtureData,
        base: &BasePrediction,
        enhancement: Option<&ContextEnhancement>,
    ) -> FixtureReport {
        let mut factors = self.derived_factors(data);
        factors.extend(data.factors.iter().cloned());
        if let Some(e) = enhancement {
            factors.extend(e.factors.iter().cloned());
        }

        let adjusted = adjust(
            base,
            &factors,
            data.simulation.as_ref(),
            &self.config.adjust,
        );
        let distribution = distribute(base.power_delta(), &factors, &self.config.distribution);
        let fused = fuse(
            base,
            data.simulation.as_ref(),
            enhancement,
            &self.config.fusion,
        );
        let staking = data
            .odds
            .as_ref()
            .map(|odds| stake(&fused, odds, data.closing_odds.as_ref(), &self.config.staking));

        info!(
            fixture = %data.fixture_id,
            base = %base.scoreline,
            fused = %fused.scoreline,
            confidence = fused.confidence,
            enhanced = enhancement.is_some(),
            "fixture report"
        );

        FixtureReport {
            fixture_id: data.fixture_id.clone(),
            base: *base,
            adjusted,
            distribution,
            fused,
            staking,
            generated_at: Utc::now(),
        }
    }

    /// Base plus refine in one call.
    pub fn run(
        &self,
        data: &FixtureData,
        enhancement: Option<&ContextEnhancement>,
    ) -> Result<FixtureReport, ModelError> {
        let base = self.base(data)?;
        Ok(self.refine(data, &base, enhancement))
    }

    /// Runs a slate of fixtures in parallel. Each fixture is independent,
    /// so this is a plain data-parallel map.
    pub fn run_batch(
        &self,
        fixtures: &[(FixtureData, Option<ContextEnhancement>)],
    ) -> Vec<Result<FixtureReport, ModelError>> {
        fixtures
            .par_iter()
            .map(|(data, enhancement)| self.run(data, enhancement.as_ref()))
            .collect()
    }

    /// Folds the raw recent-results and injury lists into home-relative
    /// context factors so the downstream stages see one uniform signal
    /// list.
    fn derived_factors(&self, data: &FixtureData) -> Vec<ContextFactor> {
        let mut factors = Vec::with_capacity(2);

        if !data.home_results.is_empty() || !data.away_results.is_empty() {
            let home_form = form_correction(&data.home_results, &self.config.form);
            let away_form = form_correction(&data.away_results, &self.config.form);
            let score = 5.0 + (home_form - away_form) / 0.2 * 5.0;
            factors.push(ContextFactor::new(
                FactorKind::TeamMorale,
                score.round().clamp(0.0, 10.0) as u8,
                "recent form balance",
                1.0,
            ));
        }

        if !data.home_injuries.is_empty() || !data.away_injuries.is_empty() {
            let home_loss = 1.0 - injury_correction(&data.home_injuries, &self.config.injury);
            let away_loss = 1.0 - injury_correction(&data.away_injuries, &self.config.injury);
            let score = 5.0 + (home_loss - away_loss) / 0.6 * 5.0;
            factors.push(ContextFactor::new(
                FactorKind::Injuries,
                score.round().clamp(0.0, 10.0) as u8,
                "injury list balance",
                1.0,
            ));
        }

        factors
    }
}
