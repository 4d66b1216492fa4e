//! Retrieval engine errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RetrievalError {
    /// Check a vector length against the configured dimension.
    pub fn check_dimension(expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::DimensionMismatch { expected, actual })
        }
    }

    /// Whether the caller may retry the same operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EmbeddingUnavailable(_) | Self::BackendUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = RetrievalError::DimensionMismatch {
            expected: 384,
            actual: 3,
        };
        let display = err.to_string();
        assert!(display.contains("384"));
        assert!(display.contains("3"));
    }

    #[test]
    fn test_check_dimension() {
        assert!(RetrievalError::check_dimension(4, 4).is_ok());
        assert!(matches!(
            RetrievalError::check_dimension(4, 2),
            Err(RetrievalError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(RetrievalError::EmbeddingUnavailable("timeout".to_string()).is_retryable());
        assert!(RetrievalError::BackendUnavailable("locked".to_string()).is_retryable());
        assert!(!RetrievalError::CorruptIndex("bad magic".to_string()).is_retryable());
        assert!(
            !RetrievalError::DimensionMismatch {
                expected: 1,
                actual: 2
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_all_error_variants() {
        let errors: Vec<RetrievalError> = vec![
            RetrievalError::DimensionMismatch {
                expected: 1,
                actual: 2,
            },
            RetrievalError::EmbeddingUnavailable("a".to_string()),
            RetrievalError::BackendUnavailable("b".to_string()),
            RetrievalError::CorruptIndex("c".to_string()),
            RetrievalError::InvalidInput("d".to_string()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
