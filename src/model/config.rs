use std::path::PathBuf;

use crate::constants::MAX_SEQ_LEN;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_path: PathBuf,

    /// Identifier reported by health endpoints (e.g. a Hugging Face repo id).
    pub model_id: String,

    pub max_seq_len: usize,
}

impl ClassifierConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P, model_id: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            model_id: model_id.into(),
            max_seq_len: MAX_SEQ_LEN,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model_path.as_os_str().is_empty() {
            return Err("model_path cannot be empty".to_string());
        }

        if self.model_id.trim().is_empty() {
            return Err("model_id cannot be empty".to_string());
        }

        if self.max_seq_len == 0 {
            return Err("max_seq_len must be greater than zero".to_string());
        }

        Ok(())
    }
}
