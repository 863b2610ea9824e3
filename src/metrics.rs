use crate::scoreline::{Outcome, OutcomeProbs};

/// Aggregate quality of a set of outcome-probability predictions against
/// settled results.
#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    pub samples: usize,
    pub brier: f64,
    pub log_loss: f64,
    pub accuracy: f64,
}

impl Metrics {
    fn empty() -> Self {
        Self {
            samples: 0,
            brier: 0.0,
            log_loss: 0.0,
            accuracy: 0.0,
        }
    }
}

/// Brier score, log-loss and arg-max accuracy over settled fixtures.
/// Mismatched or empty inputs yield the zero-sample metrics rather than
/// a panic.
pub fn evaluate(predictions: &[OutcomeProbs], outcomes: &[Outcome]) -> Metrics {
    if predictions.is_empty() || outcomes.is_empty() || predictions.len() != outcomes.len() {
        return Metrics::empty();
    }

    let mut brier_sum = 0.0_f64;
    let mut log_loss_sum = 0.0_f64;
    let mut correct = 0usize;

    for (p, outcome) in predictions.iter().zip(outcomes) {
        let y = one_hot(*outcome);
        brier_sum +=
            (p.home - y.home).powi(2) + (p.draw - y.draw).powi(2) + (p.away - y.away).powi(2);

        let actual_prob = p.for_outcome(*outcome).clamp(1e-12, 1.0);
        log_loss_sum += -actual_prob.ln();

        if p.argmax() == *outcome {
            correct += 1;
        }
    }

    let n = predictions.len() as f64;
    Metrics {
        samples: predictions.len(),
        brier: brier_sum / n,
        log_loss: log_loss_sum / n,
        accuracy: correct as f64 / n,
    }
}

fn one_hot(outcome: Outcome) -> OutcomeProbs {
    match outcome {
        Outcome::Home => OutcomeProbs::new(1.0, 0.0, 0.0),
        Outcome::Draw => OutcomeProbs::new(0.0, 1.0, 0.0),
        Outcome::Away => OutcomeProbs::new(0.0, 0.0, 1.0),
    }
}
