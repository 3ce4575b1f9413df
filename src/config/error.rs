//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;
use crate::labels::SchemeError;

/// Errors that can occur during configuration loading and validation.
///
/// All of these are fatal at startup: the server refuses to bind rather than
/// serve with a half-initialized model or mismatched labels.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// Neither endpoint has a model path.
    #[error("no model configured: set {text} and/or {claim}")]
    NoModelConfigured {
        text: &'static str,
        claim: &'static str,
    },

    /// Inference timeout was zero or not a number.
    #[error("invalid inference timeout '{value}': must be a positive number of milliseconds")]
    InvalidTimeout { value: String },

    /// Boolean flag could not be parsed.
    #[error("invalid boolean '{value}' for {name}: expected true/false/1/0/yes/no")]
    InvalidBool { name: &'static str, value: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Model directory lacks one of the files the classifier needs.
    #[error("model directory is missing required file: {path}")]
    MissingModelFile { path: PathBuf },

    /// Label scheme could not be built.
    #[error("invalid label scheme: {0}")]
    Scheme(#[from] SchemeError),

    /// Label scheme cannot be rendered by the endpoint it is attached to.
    #[error("label scheme '{scheme}' is {kind} but {route} needs a {expected} scheme")]
    SchemeNotAllowed {
        route: &'static str,
        scheme: String,
        kind: &'static str,
        expected: &'static str,
    },

    /// Label scheme does not fit the loaded model.
    #[error("label scheme does not fit the model: {0}")]
    Engine(#[from] EngineError),
}
