use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StakingConfig;
use crate::context::RiskLevel;
use crate::error::ModelError;
use crate::fusion::FinalPrediction;

/// 1X2 market selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    Home,
    Draw,
    Away,
}

/// Decimal 1X2 odds for one fixture. Valid odds are strictly above 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OddsQuote {
    pub fn new(home: f64, draw: f64, away: f64) -> Self {
        Self { home, draw, away }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for odds in [self.home, self.draw, self.away] {
            if !(odds > 1.0) {
                return Err(ModelError::InvalidOdds(odds));
            }
        }
        Ok(())
    }

    pub fn for_market(&self, market: Market) -> f64 {
        match market {
            Market::Home => self.home,
            Market::Draw => self.draw,
            Market::Away => self.away,
        }
    }
}

/// Per-market Kelly fraction and value score. `kelly` is `None` when the
/// market's odds or probability are unusable, negative when the market
/// holds no edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketEval {
    pub market: Market,
    pub kelly: Option<f64>,
    pub edge: f64,
    pub value_score: u8,
}

/// Staking recommendation for one fixture. `stake_fraction` is a share of
/// bankroll within the configured band; the empty sentinel (degenerate
/// probabilities or no usable market) carries a zero stake instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellyResult {
    pub home: MarketEval,
    pub draw: MarketEval,
    pub away: MarketEval,
    pub best_market: Market,
    pub stake_fraction: f64,
    pub risk: RiskLevel,
}

impl KellyResult {
    /// Explicit no-bet sentinel for degenerate inputs. Never a crash.
    pub fn empty() -> Self {
        let blank = |market| MarketEval {
            market,
            kelly: None,
            edge: 0.0,
            value_score: 0,
        };
        Self {
            home: blank(Market::Home),
            draw: blank(Market::Draw),
            away: blank(Market::Away),
            best_market: Market::Home,
            stake_fraction: 0.0,
            risk: RiskLevel::VeryHigh,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stake_fraction == 0.0
            && self.home.kelly.is_none()
            && self.draw.kelly.is_none()
            && self.away.kelly.is_none()
    }

    pub fn for_market(&self, market: Market) -> &MarketEval {
        match market {
            Market::Home => &self.home,
            Market::Draw => &self.draw,
            Market::Away => &self.away,
        }
    }
}

/// Full Kelly fraction `(b*p - q) / b` with `b = odds - 1`. `None` for
/// odds at or below evens or a probability outside (0, 1).
pub fn kelly_fraction(probability: f64, odds: f64) -> Option<f64> {
    if !(odds > 1.0) || !(probability > 0.0 && probability < 1.0) {
        return None;
    }
    let b = odds - 1.0;
    Some((b * probability - (1.0 - probability)) / b)
}

/// Fractional-Kelly staking recommendation for the fixture's 1X2 market.
///
/// The quarter-Kelly stake is scaled by prediction confidence and a value
/// -edge multiplier, then clamped to the configured bankroll band. Edge is
/// measured against the closing line when one is supplied.
pub fn stake(
    prediction: &FinalPrediction,
    odds: &OddsQuote,
    closing_odds: Option<&OddsQuote>,
    cfg: &StakingConfig,
) -> KellyResult {
    let probs = prediction.probs;
    let in_range =
        |p: f64| p > 0.0 && p < 1.0;
    if !in_range(probs.home) || !in_range(probs.draw) || !in_range(probs.away) {
        debug!("staking skipped: probability outside (0, 1)");
        return KellyResult::empty();
    }
    if probs.sum() <= cfg.min_probability_sum {
        debug!(sum = probs.sum(), "staking skipped: degenerate probability mass");
        return KellyResult::empty();
    }

    let evaluate = |market: Market, p: f64| -> MarketEval {
        let quoted = odds.for_market(market);
        let kelly = kelly_fraction(p, quoted);
        if kelly.is_none() {
            debug!(?market, quoted, "market rejected");
        }
        // Closing-line implied probability is the sharper reference.
        let reference = closing_odds.map(|c| c.for_market(market)).unwrap_or(quoted);
        let edge = if reference > 1.0 {
            (p - 1.0 / reference).max(0.0)
        } else {
            0.0
        };
        let value_score = match kelly {
            Some(k) => kelly_bucket(k) + edge_bucket(edge),
            None => 0,
        };
        MarketEval {
            market,
            kelly,
            edge,
            value_score,
        }
    };

    let home = evaluate(Market::Home, probs.home);
    let draw = evaluate(Market::Draw, probs.draw);
    let away = evaluate(Market::Away, probs.away);

    // Highest value score wins; ties break on the raw Kelly fraction.
    let mut best = &home;
    for eval in [&draw, &away] {
        let ahead = eval.value_score > best.value_score
            || (eval.value_score == best.value_score
                && eval.kelly.unwrap_or(f64::MIN) > best.kelly.unwrap_or(f64::MIN));
        if ahead {
            best = eval;
        }
    }

    let Some(best_kelly) = best.kelly else {
        return KellyResult::empty();
    };

    let confidence = prediction.confidence as f64 / 100.0;
    let edge_multiplier =
        (1.0 + cfg.edge_multiplier_scale * best.edge).min(cfg.edge_multiplier_cap);
    let raw_stake = best_kelly.max(0.0) * cfg.kelly_multiplier * confidence * edge_multiplier;
    let stake_fraction = raw_stake.clamp(cfg.min_stake, cfg.max_stake);

    let risk = risk_level(best_kelly, confidence, best.edge, cfg);

    debug!(
        best_market = ?best.market,
        best_kelly,
        edge = best.edge,
        stake_fraction,
        ?risk,
        "staking recommendation"
    );

    let best_market = best.market;
    KellyResult {
        home,
        draw,
        away,
        best_market,
        stake_fraction,
        risk,
    }
}

fn kelly_bucket(kelly: f64) -> u8 {
    if kelly <= 0.0 {
        0
    } else if kelly <= 0.05 {
        1
    } else if kelly <= 0.10 {
        2
    } else if kelly <= 0.15 {
        3
    } else if kelly <= 0.25 {
        4
    } else {
        5
    }
}

fn edge_bucket(edge: f64) -> u8 {
    if edge <= 0.0 {
        0
    } else if edge <= 0.02 {
        1
    } else if edge <= 0.05 {
        2
    } else if edge <= 0.08 {
        3
    } else if edge <= 0.12 {
        4
    } else {
        5
    }
}

/// Weighted risk score: Kelly magnitude 40%, inverse confidence 30%,
/// inverse edge 30%, mapped onto four tiers.
fn risk_level(kelly: f64, confidence: f64, edge: f64, cfg: &StakingConfig) -> RiskLevel {
    let kelly_part = (kelly.max(0.0) / cfg.kelly_multiplier.max(1e-12)).min(1.0);
    let confidence_part = 1.0 - confidence.clamp(0.0, 1.0);
    let edge_part = 1.0 - (edge / 0.10).min(1.0);
    let score = 0.4 * kelly_part + 0.3 * confidence_part + 0.3 * edge_part;

    if score < 0.25 {
        RiskLevel::Low
    } else if score < 0.45 {
        RiskLevel::Medium
    } else if score < 0.65 {
        RiskLevel::High
    } else {
        RiskLevel::VeryHigh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::{FusionRule, PredictionSource};
    use crate::scoreline::{OutcomeProbs, Scoreline};

    fn prediction(probs: OutcomeProbs, confidence: u8) -> FinalPrediction {
        FinalPrediction {
            scoreline: Scoreline::new(2, 0),
            confidence,
            primary_source: PredictionSource::Oracle,
            probs,
            rule: FusionRule::WeightedBlend,
        }
    }

    fn cfg() -> StakingConfig {
        StakingConfig::default()
    }

    #[test]
    fn kelly_fraction_matches_the_closed_form() {
        // b = 0.5: (0.5 x 0.70 - 0.30) / 0.5 = 0.10.
        let k = kelly_fraction(0.70, 1.5).unwrap();
        assert!((k - 0.10).abs() < 1e-12);
    }

    #[test]
    fn kelly_fraction_rejects_bad_inputs() {
        assert!(kelly_fraction(0.5, 1.0).is_none());
        assert!(kelly_fraction(0.5, 0.8).is_none());
        assert!(kelly_fraction(0.0, 2.0).is_none());
        assert!(kelly_fraction(1.0, 2.0).is_none());
        assert!(kelly_fraction(-0.2, 2.0).is_none());
    }

    #[test]
    fn worked_example_stakes_the_home_market() {
        let pred = prediction(OutcomeProbs::new(0.70, 0.20, 0.10), 75);
        let odds = OddsQuote::new(1.5, 4.0, 6.0);
        let result = stake(&pred, &odds, None, &cfg());

        assert!(!result.is_empty());
        assert_eq!(result.best_market, Market::Home);
        let home_kelly = result.home.kelly.unwrap();
        assert!((home_kelly - 0.10).abs() < 1e-9);
        // Quarter Kelly, then confidence and edge scaling, stays in band.
        assert!(result.stake_fraction <= 0.05);
        assert!(result.stake_fraction >= 0.005);
        assert!(result.stake_fraction <= home_kelly);
    }

    #[test]
    fn degenerate_probabilities_return_the_empty_sentinel() {
        let odds = OddsQuote::new(2.0, 3.5, 4.0);
        let zero = prediction(OutcomeProbs::new(0.0, 0.5, 0.5), 70);
        assert!(stake(&zero, &odds, None, &cfg()).is_empty());

        let thin = prediction(OutcomeProbs::new(0.3, 0.3, 0.3), 70);
        assert!(stake(&thin, &odds, None, &cfg()).is_empty());
    }

    #[test]
    fn unusable_odds_reject_the_market_not_the_result() {
        let pred = prediction(OutcomeProbs::new(0.5, 0.3, 0.2), 70);
        let odds = OddsQuote::new(0.9, 3.5, 4.0);
        let result = stake(&pred, &odds, None, &cfg());
        assert!(result.home.kelly.is_none());
        assert_eq!(result.home.value_score, 0);
        assert!(result.draw.kelly.is_some());
        assert!(!result.is_empty());
    }

    #[test]
    fn all_markets_unusable_returns_the_empty_sentinel() {
        let pred = prediction(OutcomeProbs::new(0.5, 0.3, 0.2), 70);
        let odds = OddsQuote::new(1.0, 0.5, 0.9);
        assert!(stake(&pred, &odds, None, &cfg()).is_empty());
    }

    #[test]
    fn stake_never_leaves_the_band() {
        let cfg = cfg();
        // Monster edge at long odds.
        let pred = prediction(OutcomeProbs::new(0.80, 0.12, 0.08), 100);
        let odds = OddsQuote::new(5.0, 6.0, 10.0);
        let result = stake(&pred, &odds, None, &cfg);
        assert!((cfg.min_stake..=cfg.max_stake).contains(&result.stake_fraction));

        // No edge at all: clamped up to the floor, flagged as risky.
        let weak = prediction(OutcomeProbs::new(0.34, 0.33, 0.33), 40);
        let tight = OddsQuote::new(2.9, 3.0, 3.1);
        let weak_result = stake(&weak, &tight, None, &cfg);
        assert!((cfg.min_stake..=cfg.max_stake).contains(&weak_result.stake_fraction));
        assert!(weak_result.risk >= RiskLevel::High);
    }

    #[test]
    fn fractional_stake_never_exceeds_full_kelly() {
        let pred = prediction(OutcomeProbs::new(0.60, 0.25, 0.15), 90);
        let odds = OddsQuote::new(2.2, 3.6, 5.5);
        let result = stake(&pred, &odds, None, &cfg());
        let full = result.for_market(result.best_market).kelly.unwrap();
        assert!(result.stake_fraction <= full);
    }

    #[test]
    fn closing_line_sharpens_the_edge() {
        let pred = prediction(OutcomeProbs::new(0.60, 0.25, 0.15), 80);
        let open = OddsQuote::new(1.8, 3.8, 5.0);
        let closing = OddsQuote::new(2.1, 3.6, 4.8);
        let without = stake(&pred, &open, None, &cfg());
        let with = stake(&pred, &open, Some(&closing), &cfg());
        // Closing home odds drifted out, so the measured edge grows.
        assert!(with.home.edge > without.home.edge);
        assert!(with.stake_fraction >= without.stake_fraction);
    }

    #[test]
    fn best_market_ties_break_on_kelly() {
        let pred = prediction(OutcomeProbs::new(0.40, 0.35, 0.25), 70);
        let odds = OddsQuote::new(3.0, 3.2, 3.5);
        let result = stake(&pred, &odds, None, &cfg());
        let best = result.for_market(result.best_market);
        for eval in [&result.home, &result.draw, &result.away] {
            assert!(best.value_score >= eval.value_score);
            if best.value_score == eval.value_score {
                assert!(best.kelly.unwrap_or(f64::MIN) >= eval.kelly.unwrap_or(f64::MIN));
            }
        }
    }

    #[test]
    fn staking_is_deterministic() {
        let pred = prediction(OutcomeProbs::new(0.55, 0.25, 0.20), 85);
        let odds = OddsQuote::new(2.0, 3.4, 4.2);
        let a = stake(&pred, &odds, None, &cfg());
        let b = stake(&pred, &odds, None, &cfg());
        assert_eq!(a, b);
    }
}
