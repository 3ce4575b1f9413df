//! Model invocation adapter.
//!
//! - [`SequenceClassifier`] is the boundary the gateway calls.
//! - [`CandleClassifier`] runs a BERT or RoBERTa classifier with candle; the
//!   encoder family comes from `model_type` in the model's `config.json`.
//! - `MockClassifier` (tests / `mock` feature) scripts logits and failures.

/// BERT and RoBERTa sequence-classification models.
pub mod bert;
pub mod classifier;
pub mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Tokenizer loading helpers.
pub mod tokenizer;


pub use bert::Architecture;
pub use classifier::{CandleClassifier, ModelInput, RawScores, SequenceClassifier};
pub use config::ClassifierConfig;
pub use device::{Backend, select_device};
pub use error::ModelError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MOCK_MODEL_ID, MockBehavior, MockClassifier};
