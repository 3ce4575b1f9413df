use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::classifier::{ModelInput, RawScores, SequenceClassifier};
use super::error::ModelError;

pub const MOCK_MODEL_ID: &str = "mock/verinews-classifier";

/// Scripted outcome of a mock forward pass.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return these logits.
    Fixed(RawScores),
    /// Always fail with an inference error.
    Fail(String),
    /// Panic inside the forward pass.
    Panic(String),
    /// Sleep, then return these logits.
    Delay(Duration, RawScores),
    /// Fail when any input text contains `needle`, otherwise return `otherwise`.
    FailWhenContains { needle: String, otherwise: RawScores },
}

/// In-memory [`SequenceClassifier`] for tests; records every input it sees.
#[derive(Debug)]
pub struct MockClassifier {
    num_labels: usize,
    model_id: String,
    behavior: Mutex<MockBehavior>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<ModelInput>>,
}

impl MockClassifier {
    pub fn new(num_labels: usize, behavior: MockBehavior) -> Self {
        Self {
            num_labels,
            model_id: MOCK_MODEL_ID.to_string(),
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Two-class mock returning `logits`.
    pub fn binary(logits: [f32; 2]) -> Self {
        Self::new(2, MockBehavior::Fixed(logits.to_vec()))
    }

    /// Three-class mock returning `logits`.
    pub fn ternary(logits: [f32; 3]) -> Self {
        Self::new(3, MockBehavior::Fixed(logits.to_vec()))
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<ModelInput> {
        self.inputs.lock().clone()
    }
}

fn contains(input: &ModelInput, needle: &str) -> bool {
    match input {
        ModelInput::Single(text) => text.contains(needle),
        ModelInput::Pair { first, second } => first.contains(needle) || second.contains(needle),
    }
}

impl SequenceClassifier for MockClassifier {
    fn infer(&self, input: &ModelInput) -> Result<RawScores, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().push(input.clone());

        let behavior = self.behavior.lock().clone();
        match behavior {
            MockBehavior::Fixed(logits) => Ok(logits),
            MockBehavior::Fail(reason) => Err(ModelError::InferenceFailed { reason }),
            MockBehavior::Panic(msg) => panic!("{}", msg),
            MockBehavior::Delay(delay, logits) => {
                std::thread::sleep(delay);
                Ok(logits)
            }
            MockBehavior::FailWhenContains { needle, otherwise } => {
                if contains(input, &needle) {
                    Err(ModelError::InferenceFailed {
                        reason: format!("backend rejected input containing '{needle}'"),
                    })
                } else {
                    Ok(otherwise)
                }
            }
        }
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn backend(&self) -> &str {
        "mock"
    }
}
