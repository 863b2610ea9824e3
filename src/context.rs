use serde::{Deserialize, Serialize};

/// Kind of qualitative signal attached to a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorKind {
    Injuries,
    TeamMorale,
    Pressure,
    Motivation,
    Weather,
    HeadToHead,
}

/// One qualitative signal for a fixture, derived upstream from news, injury
/// reports or similar unstructured sources.
///
/// Scores are fixture-relative from the home side's perspective: 5 is
/// neutral, above 5 the signal weighs on the home team (more injuries, more
/// pressure, better morale depending on kind), below 5 on the away team.
/// Multiplicity is allowed; order never matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextFactor {
    pub kind: FactorKind,
    pub score: u8,
    pub description: String,
    pub weight: f64,
}

impl ContextFactor {
    pub fn new(kind: FactorKind, score: u8, description: impl Into<String>, weight: f64) -> Self {
        Self {
            kind,
            score: score.min(10),
            description: description.into(),
            weight: weight.max(0.0),
        }
    }
}

/// Shrink family an outlier scenario belongs to, recovered by keyword scan
/// of its description and supporting factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlierKind {
    RedCard,
    Weather,
    Injury,
    Other,
}

/// A low-likelihood, high-impact alternative outcome reported by the
/// context-enhancement source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierScenario {
    pub description: String,
    pub probability: f64,
    pub impact_score: u8,
    pub supporting_factors: Vec<String>,
}

impl OutlierScenario {
    pub fn kind(&self) -> OutlierKind {
        let mut haystack = self.description.to_lowercase();
        for f in &self.supporting_factors {
            haystack.push(' ');
            haystack.push_str(&f.to_lowercase());
        }
        if ["red card", "sending off", "sent off", "dismissal"]
            .iter()
            .any(|k| haystack.contains(k))
        {
            OutlierKind::RedCard
        } else if ["weather", "storm", "rain", "snow", "wind", "fog"]
            .iter()
            .any(|k| haystack.contains(k))
        {
            OutlierKind::Weather
        } else if haystack.contains("injur") {
            OutlierKind::Injury
        } else {
            OutlierKind::Other
        }
    }
}

/// Fixture-level chaos classification shared by the context enhancement and
/// the staking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Externally supplied qualitative enrichment for one fixture: weighted
/// context factors plus outlier scenarios. Consumed, never produced, here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContextEnhancement {
    pub factors: Vec<ContextFactor>,
    pub outliers: Vec<OutlierScenario>,
}

impl ContextEnhancement {
    /// Derived risk: 60% weighted deviation of factor scores from neutral,
    /// 40% strongest probability-weighted outlier impact, on a 0-10 scale.
    pub fn risk_level(&self) -> RiskLevel {
        let factor_part = weighted_deviation(&self.factors);
        let outlier_part = self
            .outliers
            .iter()
            .map(|o| o.probability.clamp(0.0, 1.0) * o.impact_score.min(10) as f64)
            .fold(0.0_f64, f64::max);

        let raw = 0.6 * factor_part + 0.4 * outlier_part;
        if raw < 1.5 {
            RiskLevel::Low
        } else if raw < 3.0 {
            RiskLevel::Medium
        } else if raw < 4.5 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }

    /// Strongest outlier above the probability gate, if any.
    pub fn dominant_outlier(&self, probability_gate: f64) -> Option<&OutlierScenario> {
        self.outliers
            .iter()
            .filter(|o| o.probability > probability_gate)
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
    }
}

/// Weight-averaged score of the matching factors, or neutral 5 when none
/// match. Zero total weight degrades to an unweighted mean.
pub fn weighted_score(factors: &[ContextFactor], kind: FactorKind) -> f64 {
    let mut sum = 0.0;
    let mut weight_sum = 0.0;
    let mut count = 0usize;
    let mut plain_sum = 0.0;

    for f in factors.iter().filter(|f| f.kind == kind) {
        sum += f.score.min(10) as f64 * f.weight;
        weight_sum += f.weight;
        plain_sum += f.score.min(10) as f64;
        count += 1;
    }

    if count == 0 {
        return 5.0;
    }
    if weight_sum <= 1e-12 {
        return plain_sum / count as f64;
    }
    sum / weight_sum
}

fn weighted_deviation(factors: &[ContextFactor]) -> f64 {
    let mut dev = 0.0;
    let mut weight_sum = 0.0;
    for f in factors {
        let w = f.weight.max(0.0);
        dev += (f.score.min(10) as f64 - 5.0).abs() * w;
        weight_sum += w;
    }
    if weight_sum <= 1e-12 {
        return 0.0;
    }
    dev / weight_sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(kind: FactorKind, score: u8, weight: f64) -> ContextFactor {
        ContextFactor::new(kind, score, "", weight)
    }

    #[test]
    fn weighted_score_defaults_to_neutral() {
        assert_eq!(weighted_score(&[], FactorKind::Pressure), 5.0);
        let other = [factor(FactorKind::Weather, 9, 1.0)];
        assert_eq!(weighted_score(&other, FactorKind::Pressure), 5.0);
    }

    #[test]
    fn weighted_score_respects_weights() {
        let factors = [
            factor(FactorKind::Injuries, 10, 3.0),
            factor(FactorKind::Injuries, 0, 1.0),
        ];
        assert!((weighted_score(&factors, FactorKind::Injuries) - 7.5).abs() < 1e-12);
    }

    #[test]
    fn outlier_kind_from_keywords() {
        let mk = |desc: &str| OutlierScenario {
            description: desc.to_string(),
            probability: 0.2,
            impact_score: 5,
            supporting_factors: Vec::new(),
        };
        assert_eq!(mk("Early red card for the captain").kind(), OutlierKind::RedCard);
        assert_eq!(mk("Storm front due at kick-off").kind(), OutlierKind::Weather);
        assert_eq!(mk("Late injury doubt over the keeper").kind(), OutlierKind::Injury);
        assert_eq!(mk("Managerial turmoil").kind(), OutlierKind::Other);
    }

    #[test]
    fn outlier_kind_reads_supporting_factors() {
        let o = OutlierScenario {
            description: "Disrupted match".to_string(),
            probability: 0.1,
            impact_score: 6,
            supporting_factors: vec!["heavy rain forecast".to_string()],
        };
        assert_eq!(o.kind(), OutlierKind::Weather);
    }

    #[test]
    fn quiet_enhancement_is_low_risk() {
        let e = ContextEnhancement {
            factors: vec![factor(FactorKind::TeamMorale, 5, 1.0)],
            outliers: Vec::new(),
        };
        assert_eq!(e.risk_level(), RiskLevel::Low);
    }

    #[test]
    fn loud_enhancement_is_high_risk() {
        let e = ContextEnhancement {
            factors: vec![
                factor(FactorKind::Injuries, 10, 2.0),
                factor(FactorKind::Pressure, 9, 1.0),
            ],
            outliers: vec![OutlierScenario {
                description: "red card threat".to_string(),
                probability: 0.5,
                impact_score: 9,
                supporting_factors: Vec::new(),
            }],
        };
        assert!(e.risk_level() >= RiskLevel::High);
    }

    #[test]
    fn dominant_outlier_respects_the_gate() {
        let e = ContextEnhancement {
            factors: Vec::new(),
            outliers: vec![
                OutlierScenario {
                    description: "a".to_string(),
                    probability: 0.25,
                    impact_score: 9,
                    supporting_factors: Vec::new(),
                },
                OutlierScenario {
                    description: "b".to_string(),
                    probability: 0.35,
                    impact_score: 4,
                    supporting_factors: Vec::new(),
                },
            ],
        };
        assert_eq!(e.dominant_outlier(0.30).unwrap().description, "b");
        assert!(e.dominant_outlier(0.40).is_none());
    }
}
