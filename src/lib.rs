//! VeriNews library crate (used by the server and integration tests).
//!
//! A sequence-classification model sits behind an HTTP boundary. Each request
//! flows through four stages, strictly in order:
//!
//! 1. [`gateway::validate`] - required fields present and non-blank.
//! 2. [`model`] - [`SequenceClassifier::infer`] turns text into raw logits.
//! 3. [`engine`] - [`VerdictEngine`] normalizes the logits and resolves them
//!    against the endpoint's [`LabelScheme`].
//! 4. [`gateway::contract`] - the verdict is rendered as the text or claim
//!    response contract.
//!
//! ## Core Types
//! - [`Config`], [`PipelineConfig`], [`Endpoint`], [`ConfigError`] - Server configuration
//! - [`LabelScheme`], [`Label`], [`SchemeId`] - Versioned label order
//! - [`VerdictEngine`], [`Verdict`], [`EngineError`] - Verdict resolution
//! - [`CandleClassifier`], [`SequenceClassifier`], [`ModelError`] - Model adapter
//! - [`AppState`], [`Pipeline`], [`GatewayError`] - HTTP layer
//!
//! ## Test/Mock Support
//! `MockClassifier` is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod engine;
pub mod gateway;
pub mod labels;
pub mod model;

pub use config::{Config, ConfigError, Endpoint, PipelineConfig};
pub use engine::{
    EngineError, ProbabilityDistribution, Verdict, VerdictEngine, argmax_first, argmax_last,
    softmax, to_percent,
};
pub use gateway::{
    AppState, ClaimVerdictResponse, Classifiers, GatewayError, Pipeline, TextVerdictResponse,
    create_router_with_state, parse_percentage,
};
pub use labels::{Label, LabelScheme, SchemeError, SchemeId, SchemeKind};
#[cfg(any(test, feature = "mock"))]
pub use model::{MOCK_MODEL_ID, MockBehavior, MockClassifier};
pub use model::{
    CandleClassifier, ClassifierConfig, ModelError, ModelInput, RawScores, SequenceClassifier,
};
