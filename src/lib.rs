//! Outcome prediction and bankroll staking for a single football fixture.
//!
//! The pipeline runs strictly downstream: standings feed a deterministic
//! power-score base prediction, context corrections adjust it, a score
//! distribution spreads it over candidate scorelines, the fusion engine
//! blends it with an external simulation and context enhancement, and the
//! staking engine turns the fused probabilities plus bookmaker odds into a
//! fractional-Kelly recommendation. Every stage is a pure function over
//! immutable inputs; fetching, caching and presentation live elsewhere.

pub mod adjust;
pub mod config;
pub mod context;
pub mod corrections;
pub mod distribution;
pub mod error;
pub mod fusion;
pub mod metrics;
pub mod pipeline;
pub mod power;
pub mod scoreline;
pub mod staking;
pub mod standings;
pub mod synthetic;

pub use crate::adjust::AdjustedPrediction;
pub use crate::config::ModelConfig;
pub use crate::context::{ContextEnhancement, ContextFactor, FactorKind, RiskLevel};
pub use crate::distribution::ScoreDistribution;
pub use crate::error::ModelError;
pub use crate::fusion::{FinalPrediction, FusionWeights, PredictionSource};
pub use crate::pipeline::{FixtureData, FixtureReport, Pipeline};
pub use crate::power::BasePrediction;
pub use crate::scoreline::{Outcome, OutcomeProbs, Scoreline, SimulationResult};
pub use crate::staking::{KellyResult, Market, OddsQuote};
pub use crate::standings::TeamStanding;
