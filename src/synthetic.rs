use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::context::{ContextEnhancement, ContextFactor, FactorKind, OutlierScenario};
use crate::corrections::{
    InjurySeverity, PlayerImportance, PlayerInjury, PlayerRole, RecentResult,
};
use crate::pipeline::FixtureData;
use crate::scoreline::{OutcomeProbs, Scoreline, SimulationResult};
use crate::staking::OddsQuote;
use crate::standings::TeamStanding;

/// Seeded generators of plausible fixture inputs for tests and benchmarks.
/// Everything here is deterministic per seed so failures reproduce.

pub fn standing(rng: &mut StdRng, rank: u32) -> TeamStanding {
    let games = rng.gen_range(10..=38);
    // Better-ranked sides earn more per game, with noise.
    let ppg = (2.4 - rank as f64 * 0.08 + rng.gen_range(-0.3..0.3)).clamp(0.3, 2.6);
    let gdpg = (1.4 - rank as f64 * 0.12 + rng.gen_range(-0.4..0.4)).clamp(-1.8, 1.8);
    TeamStanding::new(
        rank,
        (ppg * games as f64).round() as u32,
        (gdpg * games as f64).round() as i32,
        games,
    )
}

pub fn recent_results(rng: &mut StdRng, n: usize) -> Vec<RecentResult> {
    (0..n)
        .map(|_| match rng.gen_range(0..10) {
            0..=4 => RecentResult::Win,
            5..=6 => RecentResult::Draw,
            _ => RecentResult::Loss,
        })
        .collect()
}

pub fn injuries(rng: &mut StdRng, n: usize) -> Vec<PlayerInjury> {
    let roles = [
        PlayerRole::Goalkeeper,
        PlayerRole::Defender,
        PlayerRole::Midfielder,
        PlayerRole::Forward,
    ];
    let severities = [
        InjurySeverity::Minor,
        InjurySeverity::Moderate,
        InjurySeverity::Severe,
    ];
    let importances = [
        PlayerImportance::Rotation,
        PlayerImportance::Regular,
        PlayerImportance::KeyPlayer,
    ];
    (0..n)
        .map(|_| PlayerInjury {
            role: roles[rng.gen_range(0..roles.len())],
            severity: severities[rng.gen_range(0..severities.len())],
            importance: importances[rng.gen_range(0..importances.len())],
        })
        .collect()
}

pub fn simulation(rng: &mut StdRng) -> SimulationResult {
    let home: f64 = rng.gen_range(0.15..0.60);
    let draw = rng.gen_range(0.15..(0.95 - home).min(0.45));
    let away = (1.0 - home - draw).max(0.05);
    SimulationResult {
        most_likely: Scoreline::new(rng.gen_range(0..=3), rng.gen_range(0..=2)),
        probs: OutcomeProbs::new(home, draw, away).normalized(),
    }
}

pub fn odds(rng: &mut StdRng) -> OddsQuote {
    OddsQuote::new(
        rng.gen_range(1.3..3.5),
        rng.gen_range(2.8..4.5),
        rng.gen_range(1.8..8.0),
    )
}

pub fn enhancement(rng: &mut StdRng) -> ContextEnhancement {
    let kinds = [
        FactorKind::Injuries,
        FactorKind::TeamMorale,
        FactorKind::Pressure,
        FactorKind::Motivation,
    ];
    let factors = (0..rng.gen_range(1..=4))
        .map(|i| {
            ContextFactor::new(
                kinds[rng.gen_range(0..kinds.len())],
                rng.gen_range(0..=10),
                format!("synthetic signal {i}"),
                rng.gen_range(0.5..2.0),
            )
        })
        .collect();
    let outliers = if rng.gen_bool(0.4) {
        vec![OutlierScenario {
            description: "red card exposure".to_string(),
            probability: rng.gen_range(0.05..0.45),
            impact_score: rng.gen_range(3..=9),
            supporting_factors: Vec::new(),
        }]
    } else {
        Vec::new()
    };
    ContextEnhancement { factors, outliers }
}

/// A complete, internally consistent fixture snapshot.
pub fn fixture(seed: u64) -> FixtureData {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = FixtureData::new(format!("synthetic-{seed}"));
    let home_rank = rng.gen_range(1..=20);
    let away_rank = rng.gen_range(1..=20);
    data.home_standing = Some(standing(&mut rng, home_rank));
    data.away_standing = Some(standing(&mut rng, away_rank));
    data.source_quality = rng.gen_range(0.6..=1.0);
    data.home_results = recent_results(&mut rng, 5);
    data.away_results = recent_results(&mut rng, 5);
    let home_knocks = rng.gen_range(0..3);
    let away_knocks = rng.gen_range(0..3);
    data.home_injuries = injuries(&mut rng, home_knocks);
    data.away_injuries = injuries(&mut rng, away_knocks);
    data.simulation = Some(simulation(&mut rng));
    data.odds = Some(odds(&mut rng));
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_fixture() {
        let a = fixture(42);
        let b = fixture(42);
        assert_eq!(a.home_standing, b.home_standing);
        assert_eq!(a.home_results, b.home_results);
        assert_eq!(a.odds.map(|o| o.home), b.odds.map(|o| o.home));
    }

    #[test]
    fn generated_standings_validate() {
        let mut rng = StdRng::seed_from_u64(7);
        for rank in 1..=20 {
            assert!(standing(&mut rng, rank).validate().is_ok());
        }
    }

    #[test]
    fn generated_simulation_probs_are_normalized() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let sim = simulation(&mut rng);
            assert!((sim.probs.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn generated_odds_are_valid() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..50 {
            assert!(odds(&mut rng).validate().is_ok());
        }
    }
}
