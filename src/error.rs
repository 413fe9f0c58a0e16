use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

/// Error taxonomy for a simulation run.
///
/// Out-of-vocabulary words and zero-length sentences are deliberately absent:
/// the former is an expected condition handled by the unknown-word machinery,
/// the latter only makes the effort ratios undefined for that sentence.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("corpora are not aligned: {sources} source lines vs {references} reference lines")]
    AlignmentExhausted { sources: usize, references: usize },

    #[error("sequence generator failed: {0}")]
    Generator(String),
}

#[cfg(test)]
mod tests {
    use super::SimError;

    #[test]
    fn alignment_error_reports_both_counts() {
        let err = SimError::AlignmentExhausted {
            sources: 10,
            references: 8,
        };
        let text = err.to_string();
        assert!(text.contains("10 source"), "got: {text}");
        assert!(text.contains("8 reference"), "got: {text}");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing corpus");
        let err: SimError = io.into();
        assert!(matches!(err, SimError::Io(_)));
        assert!(err.to_string().contains("missing corpus"));
    }
}
