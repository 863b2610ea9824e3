use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PowerConfig;
use crate::error::ModelError;
use crate::scoreline::Scoreline;
use crate::standings::{TeamStanding, validate_source_quality};

/// Which side of the rating gap the base model leaned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerTag {
    StrongAway,
    AwayEdge,
    Balanced,
    HomeEdge,
    StrongHome,
}

/// Deterministic base prediction from the power-score model. Immutable once
/// produced; downstream stages derive new objects from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasePrediction {
    pub scoreline: Scoreline,
    pub confidence: u8,
    pub home_power: u32,
    pub away_power: u32,
    pub tag: PowerTag,
}

impl BasePrediction {
    pub fn power_delta(&self) -> i64 {
        self.home_power as i64 - self.away_power as i64
    }
}

/// Synthetic strength rating in [0, max_power] from a standings snapshot.
///
/// rating = (rank_base - rank x rank_penalty)
///        + round(points_per_game x ppg_scale)
///        + round(goal_diff_per_game x gdpg_scale)
///        + home bonus
pub fn power_score(standing: &TeamStanding, home: bool, cfg: &PowerConfig) -> u32 {
    let rank_term = cfg.rank_base - standing.rank as f64 * cfg.rank_penalty;
    let ppg_term = (standing.points_per_game() * cfg.ppg_scale).round();
    let gdpg_term = (standing.goal_diff_per_game() * cfg.gdpg_scale).round();
    let bonus = if home { cfg.home_bonus } else { 0.0 };

    let raw = rank_term + ppg_term + gdpg_term + bonus;
    raw.clamp(0.0, cfg.max_power as f64) as u32
}

/// Base prediction for one fixture. Standings are validated, not coerced;
/// pass `TeamStanding::synthetic_mid_table()` for a side with no table data.
pub fn compute_base(
    home: &TeamStanding,
    away: &TeamStanding,
    source_quality: f64,
    cfg: &PowerConfig,
) -> Result<BasePrediction, ModelError> {
    home.validate()?;
    away.validate()?;
    validate_source_quality(source_quality)?;

    let home_power = power_score(home, true, cfg);
    let away_power = power_score(away, false, cfg);
    let delta = home_power as i64 - away_power as i64;

    let (scoreline, raw_confidence, tag) = select_scoreline(delta, cfg);
    let confidence = (raw_confidence as f64 * source_quality).round().clamp(0.0, 100.0) as u8;

    debug!(
        home_power,
        away_power,
        delta,
        %scoreline,
        confidence,
        "base prediction"
    );

    Ok(BasePrediction {
        scoreline,
        confidence,
        home_power,
        away_power,
        tag,
    })
}

fn select_scoreline(delta: i64, cfg: &PowerConfig) -> (Scoreline, u8, PowerTag) {
    if delta < -cfg.strong_delta {
        (Scoreline::new(0, 3), 90, PowerTag::StrongAway)
    } else if delta < -cfg.moderate_delta {
        (Scoreline::new(1, 2), 75, PowerTag::AwayEdge)
    } else if delta <= cfg.moderate_delta {
        (Scoreline::new(1, 1), 60, PowerTag::Balanced)
    } else if delta <= cfg.strong_delta {
        (Scoreline::new(2, 1), 75, PowerTag::HomeEdge)
    } else {
        (Scoreline::new(3, 0), 90, PowerTag::StrongHome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PowerConfig {
        PowerConfig::default()
    }

    #[test]
    fn runaway_leader_beats_mid_table() {
        // Worked example: 97 + 25 + 8 + 10 = 140 vs 55 + 13 - 1 = 67.
        let home = TeamStanding::new(1, 50, 30, 20);
        let away = TeamStanding::new(15, 25, -5, 20);
        let base = compute_base(&home, &away, 1.0, &cfg()).unwrap();
        assert!(base.power_delta() > 30);
        assert_eq!(base.scoreline, Scoreline::new(3, 0));
        assert_eq!(base.confidence, 90);
        assert_eq!(base.tag, PowerTag::StrongHome);
    }

    #[test]
    fn identical_standings_predict_a_draw() {
        let s = TeamStanding::new(8, 30, 2, 20);
        let base = compute_base(&s, &s, 1.0, &cfg()).unwrap();
        // Home bonus alone stays inside the balanced band.
        assert_eq!(base.scoreline, Scoreline::new(1, 1));
        assert_eq!(base.confidence, 60);
        assert_eq!(base.tag, PowerTag::Balanced);
    }

    #[test]
    fn power_stays_within_bounds() {
        let best = TeamStanding::new(1, 114, 90, 38);
        let worst = TeamStanding::new(40, 0, -90, 38);
        assert!(power_score(&best, true, &cfg()) <= 200);
        assert_eq!(power_score(&worst, false, &cfg()), 0);
    }

    #[test]
    fn more_points_never_lowers_power() {
        let cfg = cfg();
        let mut prev = 0;
        for points in (0..=90).step_by(3) {
            let s = TeamStanding::new(10, points, 0, 30);
            let p = power_score(&s, false, &cfg);
            assert!(p >= prev, "points {points} dropped power {prev} -> {p}");
            prev = p;
        }
    }

    #[test]
    fn better_goal_difference_never_lowers_power() {
        let cfg = cfg();
        let mut prev = 0;
        for gd in -40..=40 {
            let s = TeamStanding::new(10, 40, gd, 30);
            let p = power_score(&s, false, &cfg);
            assert!(p >= prev, "gd {gd} dropped power {prev} -> {p}");
            prev = p;
        }
    }

    #[test]
    fn source_quality_scales_confidence() {
        let home = TeamStanding::new(1, 50, 30, 20);
        let away = TeamStanding::new(15, 25, -5, 20);
        let base = compute_base(&home, &away, 0.5, &cfg()).unwrap();
        assert_eq!(base.confidence, 45);
    }

    #[test]
    fn invalid_inputs_are_typed_failures() {
        let ok = TeamStanding::synthetic_mid_table();
        let bad = TeamStanding::new(3, 10, 0, 0);
        assert!(compute_base(&bad, &ok, 1.0, &cfg()).is_err());
        assert!(compute_base(&ok, &bad, 1.0, &cfg()).is_err());
        assert!(compute_base(&ok, &ok, 1.5, &cfg()).is_err());
    }

    #[test]
    fn every_band_is_reachable() {
        let c = cfg();
        assert_eq!(select_scoreline(-31, &c).0, Scoreline::new(0, 3));
        assert_eq!(select_scoreline(-30, &c).0, Scoreline::new(1, 2));
        assert_eq!(select_scoreline(-16, &c).0, Scoreline::new(1, 2));
        assert_eq!(select_scoreline(-15, &c).0, Scoreline::new(1, 1));
        assert_eq!(select_scoreline(15, &c).0, Scoreline::new(1, 1));
        assert_eq!(select_scoreline(16, &c).0, Scoreline::new(2, 1));
        assert_eq!(select_scoreline(30, &c).0, Scoreline::new(2, 1));
        assert_eq!(select_scoreline(31, &c).0, Scoreline::new(3, 0));
    }
}
