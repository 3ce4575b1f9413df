use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
/// Errors raised while building a [`LabelScheme`](super::LabelScheme).
pub enum SchemeError {
    /// Scheme identifier is not of the form `name@version`.
    #[error("malformed label scheme id '{value}': expected 'name@version'")]
    MalformedId {
        /// Raw identifier.
        value: String,
    },

    /// Scheme name/version is not a known built-in and not `custom@*`.
    #[error("unknown label scheme '{id}'")]
    UnknownScheme {
        /// Scheme identifier.
        id: String,
    },

    /// `custom@*` scheme configured without labels.
    #[error("label scheme '{id}' requires an explicit label list")]
    MissingLabels {
        /// Scheme identifier.
        id: String,
    },

    /// Labels were supplied for a built-in scheme with a fixed label order.
    #[error("label scheme '{id}' has a fixed label order; explicit labels are not accepted")]
    UnexpectedLabels {
        /// Scheme identifier.
        id: String,
    },

    /// A label name was empty after trimming.
    #[error("label names cannot be empty")]
    EmptyLabel,

    /// The same label appears at two positions.
    #[error("duplicate label '{label}' in scheme")]
    DuplicateLabel {
        /// Offending label.
        label: String,
    },

    /// Number of labels is not 1, 2 or 3.
    #[error("unsupported class count {count}: expected 1, 2 or 3 labels")]
    UnsupportedClassCount {
        /// Number of labels supplied.
        count: usize,
    },
}
