use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
/// Errors returned by the verdict engine.
pub enum EngineError {
    /// Model class count disagrees with the configured scheme (startup only).
    #[error(
        "label scheme '{scheme}' maps {scheme_classes} classes but the model emits {model_classes}"
    )]
    ClassCountMismatch {
        /// Scheme identifier.
        scheme: String,
        /// Positions mapped by the scheme.
        scheme_classes: usize,
        /// Class count reported by the model.
        model_classes: usize,
    },

    /// A one-class model was configured without opting in (startup only).
    #[error(
        "label scheme '{scheme}' is degenerate (single class); set VERINEWS_ALLOW_DEGENERATE=true to serve it"
    )]
    DegenerateDisallowed {
        /// Scheme identifier.
        scheme: String,
    },

    /// The backend returned a score vector of the wrong length.
    #[error("score vector has {actual} entries, expected {expected}")]
    ShapeMismatch {
        /// Expected length.
        expected: usize,
        /// Observed length.
        actual: usize,
    },

    /// The score vector is empty or contains non-finite values.
    #[error("malformed score vector: {reason}")]
    MalformedScores {
        /// What was wrong.
        reason: String,
    },
}

impl EngineError {
    /// Returns `true` for errors that can only arise while building the engine.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EngineError::ClassCountMismatch { .. } | EngineError::DegenerateDisallowed { .. }
        )
    }
}
