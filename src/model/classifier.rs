use candle_core::{DType, Device, Tensor};
use parking_lot::Mutex;
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use super::bert::SequenceClassificationModel;
use super::config::ClassifierConfig;
use super::device::{Backend, select_device};
use super::error::ModelError;
use super::tokenizer::load_classification_tokenizer;

/// Unnormalized class scores, one per model class, in model order.
pub type RawScores = Vec<f32>;

/// Preprocessed request text handed to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelInput {
    /// Single-text mode.
    Single(String),
    /// Claim/evidence mode, encoded as a sentence pair.
    Pair { first: String, second: String },
}

impl ModelInput {
    pub fn single(text: impl Into<String>) -> Self {
        ModelInput::Single(text.into())
    }

    pub fn pair(first: impl Into<String>, second: impl Into<String>) -> Self {
        ModelInput::Pair {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Total input length in bytes (for logging).
    pub fn len(&self) -> usize {
        match self {
            ModelInput::Single(text) => text.len(),
            ModelInput::Pair { first, second } => first.len() + second.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> &'static str {
        match self {
            ModelInput::Single(_) => "single",
            ModelInput::Pair { .. } => "pair",
        }
    }
}

/// Model invocation boundary.
///
/// Implementations must be inference-only and deterministic for a fixed
/// model snapshot, and must return exactly [`num_labels`](Self::num_labels)
/// scores. Calls are synchronous and may be CPU-heavy; async callers run them
/// on a blocking thread.
pub trait SequenceClassifier: Send + Sync {
    fn infer(&self, input: &ModelInput) -> Result<RawScores, ModelError>;

    /// Class count the model was built with.
    fn num_labels(&self) -> usize;

    fn model_id(&self) -> &str;

    /// Compute backend name (`cpu`, `cuda`, `metal`).
    fn backend(&self) -> &str;
}

/// Candle-backed BERT/RoBERTa sequence classifier.
pub struct CandleClassifier {
    device: Device,
    backend: Backend,
    config: ClassifierConfig,
    model: SequenceClassificationModel,
    tokenizer: Tokenizer,
    /// Held around forward passes on accelerators; CPU passes run in parallel.
    device_lock: Option<Mutex<()>>,
}

impl std::fmt::Debug for CandleClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleClassifier")
            .field("backend", &self.backend)
            .field("config", &self.config)
            .field("num_labels", &self.model.num_labels())
            .finish()
    }
}

impl CandleClassifier {
    pub fn load(config: ClassifierConfig) -> Result<Self, ModelError> {
        if let Err(msg) = config.validate() {
            return Err(ModelError::InvalidConfig { reason: msg });
        }

        let (device, backend) = select_device();

        let model_path = &config.model_path;
        if !model_path.exists() {
            return Err(ModelError::ModelNotFound {
                path: model_path.clone(),
            });
        }

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !model_path.join(required).exists() {
                return Err(ModelError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_path.display()),
                });
            }
        }

        info!(
            model_path = %model_path.display(),
            model_id = %config.model_id,
            "Loading classifier model"
        );

        let model = SequenceClassificationModel::load(model_path, &device).map_err(|e| {
            ModelError::ModelLoadFailed {
                reason: format!("Failed to load classifier weights: {}", e),
            }
        })?;

        let tokenizer =
            load_classification_tokenizer(model_path, config.max_seq_len).map_err(|e| {
                ModelError::ModelLoadFailed {
                    reason: format!("Failed to load tokenizer: {}", e),
                }
            })?;

        let device_lock = backend.is_accelerator().then(|| Mutex::new(()));

        info!(
            model_id = %config.model_id,
            num_labels = model.num_labels(),
            architecture = model.architecture().as_str(),
            class_names = ?model.class_names(),
            backend = backend.as_str(),
            "Classifier model loaded successfully"
        );

        Ok(Self {
            device,
            backend,
            config,
            model,
            tokenizer,
            device_lock,
        })
    }

    fn encode(&self, input: &ModelInput) -> Result<Encoding, ModelError> {
        let encoded = match input {
            ModelInput::Single(text) => self.tokenizer.encode(text.as_str(), true),
            ModelInput::Pair { first, second } => self
                .tokenizer
                .encode((first.as_str(), second.as_str()), true),
        };

        encoded.map_err(|e| ModelError::TokenizationFailed {
            reason: e.to_string(),
        })
    }

    fn to_batch_tensor(&self, data: &[u32]) -> Result<Tensor, ModelError> {
        Ok(Tensor::new(data, &self.device)?.unsqueeze(0)?)
    }
}

impl SequenceClassifier for CandleClassifier {
    fn infer(&self, input: &ModelInput) -> Result<RawScores, ModelError> {
        debug!(
            mode = input.mode(),
            input_len = input.len(),
            "Running classifier forward pass"
        );

        let tokens = self.encode(input)?;

        let token_ids = self.to_batch_tensor(tokens.get_ids())?;
        let type_ids = self.to_batch_tensor(tokens.get_type_ids())?;
        let attention_mask = self.to_batch_tensor(tokens.get_attention_mask())?;

        let logits = {
            let _guard = self.device_lock.as_ref().map(|lock| lock.lock());
            self.model
                .forward(&token_ids, &type_ids, &attention_mask)
                .map_err(|e| ModelError::InferenceFailed {
                    reason: e.to_string(),
                })?
        };

        let expected = self.model.num_labels();
        let dims = logits.dims().to_vec();
        if dims != [1, expected] {
            return Err(ModelError::UnexpectedShape { expected, dims });
        }

        let scores = logits
            .squeeze(0)?
            .to_dtype(DType::F32)?
            .to_vec1::<f32>()?;

        debug!(scores = ?scores, "Classifier logits");

        Ok(scores)
    }

    fn num_labels(&self) -> usize {
        self.model.num_labels()
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn backend(&self) -> &str {
        self.backend.as_str()
    }
}
