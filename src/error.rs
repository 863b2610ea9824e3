use thiserror::Error;

/// Validation failures for inputs the model refuses to reason over.
///
/// Missing data is not an error: absent standings, empty injury lists and
/// absent simulation/enhancement objects all have well-defined neutral
/// defaults. These variants cover programmer-error-class inputs only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("games played must be positive, got {0}")]
    InvalidGamesPlayed(u32),

    #[error("league rank must be positive, got {0}")]
    InvalidRank(u32),

    #[error("source quality must be within [0, 1], got {0}")]
    SourceQualityOutOfRange(f64),

    #[error("decimal odds must be greater than 1.0, got {0}")]
    InvalidOdds(f64),

    #[error("outcome probabilities are degenerate (sum {sum:.4})")]
    DegenerateProbabilities { sum: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_the_offending_value() {
        let err = ModelError::InvalidOdds(0.95);
        assert!(err.to_string().contains("0.95"));
        let err = ModelError::SourceQualityOutOfRange(1.2);
        assert!(err.to_string().contains("1.2"));
    }
}
