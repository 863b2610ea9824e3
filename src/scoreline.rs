use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A full-time scoreline, home goals first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Scoreline {
    pub home: u8,
    pub away: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Scoreline {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn outcome(&self) -> Outcome {
        classify_outcome(self.home as i32, self.away as i32)
    }

    pub fn goal_diff(&self) -> i32 {
        self.home as i32 - self.away as i32
    }

    pub fn total_goals(&self) -> u32 {
        self.home as u32 + self.away as u32
    }
}

pub fn classify_outcome(home_goals: i32, away_goals: i32) -> Outcome {
    if home_goals > away_goals {
        Outcome::Home
    } else if home_goals < away_goals {
        Outcome::Away
    } else {
        Outcome::Draw
    }
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

impl From<Scoreline> for String {
    fn from(s: Scoreline) -> String {
        s.to_string()
    }
}

impl FromStr for Scoreline {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let Some((h, a)) = raw.trim().split_once('-') else {
            return Err(format!("malformed scoreline {raw:?}"));
        };
        let home = h
            .trim()
            .parse::<u8>()
            .map_err(|_| format!("malformed home goals in {raw:?}"))?;
        let away = a
            .trim()
            .parse::<u8>()
            .map_err(|_| format!("malformed away goals in {raw:?}"))?;
        Ok(Self { home, away })
    }
}

impl TryFrom<String> for Scoreline {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Home/draw/away outcome probabilities for one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbs {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeProbs {
    pub fn uniform() -> Self {
        Self {
            home: 1.0 / 3.0,
            draw: 1.0 / 3.0,
            away: 1.0 / 3.0,
        }
    }

    pub fn new(home: f64, draw: f64, away: f64) -> Self {
        Self { home, draw, away }
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }

    /// Rescale so the three probabilities sum to 1.0. Degenerate inputs
    /// (all-zero or negative mass) fall back to the uniform distribution.
    pub fn normalized(&self) -> Self {
        let h = self.home.max(0.0);
        let d = self.draw.max(0.0);
        let a = self.away.max(0.0);
        let sum = h + d + a;
        if sum <= 1e-12 {
            return Self::uniform();
        }
        Self {
            home: h / sum,
            draw: d / sum,
            away: a / sum,
        }
    }

    pub fn argmax(&self) -> Outcome {
        if self.home >= self.draw && self.home >= self.away {
            Outcome::Home
        } else if self.draw >= self.away {
            Outcome::Draw
        } else {
            Outcome::Away
        }
    }

    pub fn max_prob(&self) -> f64 {
        self.home.max(self.draw).max(self.away)
    }

    pub fn for_outcome(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// Externally supplied Monte-Carlo-style estimate. Consumed, never produced,
/// by this crate; `probs` is expected to sum to ~1 and is re-normalized at
/// the point of use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationResult {
    pub most_likely: Scoreline,
    pub probs: OutcomeProbs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoreline_roundtrips_through_string() {
        let s: Scoreline = "2-1".parse().unwrap();
        assert_eq!(s, Scoreline::new(2, 1));
        assert_eq!(s.to_string(), "2-1");
        assert!("2:1".parse::<Scoreline>().is_err());
        assert!("x-1".parse::<Scoreline>().is_err());
    }

    #[test]
    fn outcome_classification() {
        assert_eq!(Scoreline::new(2, 1).outcome(), Outcome::Home);
        assert_eq!(Scoreline::new(1, 1).outcome(), Outcome::Draw);
        assert_eq!(Scoreline::new(0, 3).outcome(), Outcome::Away);
    }

    #[test]
    fn normalized_handles_degenerate_mass() {
        let p = OutcomeProbs::new(0.0, 0.0, 0.0).normalized();
        assert!((p.sum() - 1.0).abs() < 1e-12);
        assert!((p.home - 1.0 / 3.0).abs() < 1e-12);

        let q = OutcomeProbs::new(0.2, 0.1, 0.1).normalized();
        assert!((q.sum() - 1.0).abs() < 1e-12);
        assert!((q.home - 0.5).abs() < 1e-12);
    }

    #[test]
    fn argmax_prefers_home_then_draw_on_ties() {
        let p = OutcomeProbs::new(0.4, 0.4, 0.2);
        assert_eq!(p.argmax(), Outcome::Home);
        let q = OutcomeProbs::new(0.2, 0.4, 0.4);
        assert_eq!(q.argmax(), Outcome::Draw);
    }
}
