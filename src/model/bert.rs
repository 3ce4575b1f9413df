use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{
    Config as RobertaConfig, XLMRobertaForSequenceClassification,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const ROBERTA_EMBEDDINGS: &str = "roberta.embeddings.word_embeddings.weight";
const ROBERTA_HEAD: &str = "classifier.dense.weight";

/// Encoder family declared by `model_type` in `config.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Bert,
    /// Positions start at `pad_token_id + 1`; head is `dense` + tanh + `out_proj`.
    Roberta,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Bert => "bert",
            Architecture::Roberta => "roberta",
        }
    }
}

/// Fields of `config.json` describing the classification head.
#[derive(Debug, Default, Deserialize)]
struct HeadConfig {
    model_type: Option<String>,
    num_labels: Option<usize>,
    id2label: Option<BTreeMap<String, String>>,
}

impl HeadConfig {
    /// `id2label` wins over `num_labels`; two classes when neither is present.
    fn class_names(&self) -> Vec<String> {
        if let Some(map) = &self.id2label
            && !map.is_empty()
        {
            let mut entries: Vec<(usize, &String)> = map
                .iter()
                .filter_map(|(k, v)| k.parse::<usize>().ok().map(|idx| (idx, v)))
                .collect();
            entries.sort_by_key(|(idx, _)| *idx);
            return entries.into_iter().map(|(_, v)| v.clone()).collect();
        }

        let count = self.num_labels.unwrap_or(2);
        (0..count).map(|idx| format!("LABEL_{idx}")).collect()
    }

    fn architecture(&self) -> Architecture {
        match self.model_type.as_deref() {
            Some("roberta") | Some("xlm-roberta") => Architecture::Roberta,
            _ => Architecture::Bert,
        }
    }
}

/// BERT classifier: optional pooler (dense + tanh) then a single linear layer.
struct BertClassification {
    encoder: BertModel,
    pooler: Option<Linear>,
    classifier: Linear,
}

impl BertClassification {
    fn load(vb: VarBuilder, config: &BertConfig, num_labels: usize) -> Result<Self> {
        // BertModel numbers positions from 0, which is wrong for RoBERTa weights.
        if vb.contains_tensor(ROBERTA_EMBEDDINGS) || vb.contains_tensor(ROBERTA_HEAD) {
            return Err(candle::Error::Msg(
                "checkpoint has RoBERTa weights but config.json does not declare \
                 model_type \"roberta\""
                    .to_string(),
            ));
        }

        let encoder_vb = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            vb.pp("bert")
        } else {
            vb.clone()
        };

        let hidden_size = config.hidden_size;
        let pooler = if encoder_vb.contains_tensor("pooler.dense.weight") {
            Some(candle_nn::linear(
                hidden_size,
                hidden_size,
                encoder_vb.pp("pooler.dense"),
            )?)
        } else {
            None
        };
        let classifier = candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))?;
        let encoder = BertModel::load(encoder_vb, config)?;

        Ok(Self {
            encoder,
            pooler,
            classifier,
        })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let output = self
            .encoder
            .forward(input_ids, token_type_ids, Some(attention_mask))?;
        let cls_token = output.i((.., 0, ..))?;
        let pooled = match &self.pooler {
            Some(pooler) => pooler.forward(&cls_token)?.tanh()?,
            None => cls_token,
        };
        self.classifier.forward(&pooled)
    }
}

fn load_roberta(
    vb: VarBuilder,
    config_content: &str,
    num_labels: usize,
) -> Result<XLMRobertaForSequenceClassification> {
    if !vb.contains_tensor(ROBERTA_EMBEDDINGS) {
        return Err(candle::Error::Msg(
            "config.json declares model_type \"roberta\" but the weights have no \
             roberta.-prefixed encoder"
                .to_string(),
        ));
    }

    let mut value: serde_json::Value = serde_json::from_str(config_content)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
    if let Some(fields) = value.as_object_mut() {
        fields
            .entry("position_embedding_type")
            .or_insert_with(|| serde_json::Value::from("absolute"));
    }
    let config: RobertaConfig = serde_json::from_value(value)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse RoBERTa config: {}", e)))?;

    XLMRobertaForSequenceClassification::new(num_labels, &config, vb)
}

enum Backbone {
    Bert(BertClassification),
    Roberta(XLMRobertaForSequenceClassification),
}

/// BERT or RoBERTa encoder with its sequence-classification head.
///
/// Weights are memory-mapped read-only; forward passes build no gradient
/// graph, so the model is safe to share across request tasks.
pub struct SequenceClassificationModel {
    backbone: Backbone,
    class_names: Vec<String>,
}

impl SequenceClassificationModel {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");

        let config_content = std::fs::read_to_string(config_path)?;
        let head_config: HeadConfig = serde_json::from_str(&config_content)
            .map_err(|e| candle::Error::Msg(format!("Failed to parse head config: {}", e)))?;

        let class_names = head_config.class_names();
        if class_names.is_empty() {
            return Err(candle::Error::Msg(
                "config.json declares zero labels".to_string(),
            ));
        }

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

        let backbone = match head_config.architecture() {
            Architecture::Roberta => {
                Backbone::Roberta(load_roberta(vb, &config_content, class_names.len())?)
            }
            Architecture::Bert => {
                let config: BertConfig = serde_json::from_str(&config_content)
                    .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
                Backbone::Bert(BertClassification::load(vb, &config, class_names.len())?)
            }
        };

        Ok(Self {
            backbone,
            class_names,
        })
    }

    pub fn architecture(&self) -> Architecture {
        match self.backbone {
            Backbone::Bert(_) => Architecture::Bert,
            Backbone::Roberta(_) => Architecture::Roberta,
        }
    }

    /// Number of logits produced per input.
    pub fn num_labels(&self) -> usize {
        self.class_names.len()
    }

    /// Class names from `config.json`, in logit order (informational only).
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        match &self.backbone {
            Backbone::Bert(model) => model.forward(input_ids, token_type_ids, attention_mask),
            // single token type
            Backbone::Roberta(model) => {
                model.forward(input_ids, attention_mask, &input_ids.zeros_like()?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn head(json: &str) -> HeadConfig {
        serde_json::from_str(json).unwrap()
    }

    fn write_checkpoint(dir: &Path, config: &str, tensor_names: &[&str]) {
        std::fs::write(dir.join("config.json"), config).unwrap();
        let tensors: HashMap<String, Tensor> = tensor_names
            .iter()
            .map(|name| {
                let t = Tensor::zeros((2, 2), DType::F32, &Device::Cpu).unwrap();
                (name.to_string(), t)
            })
            .collect();
        candle::safetensors::save(&tensors, dir.join("model.safetensors")).unwrap();
    }

    fn load_error(config: &str, tensor_names: &[&str]) -> String {
        let dir = TempDir::new().unwrap();
        write_checkpoint(dir.path(), config, tensor_names);
        match SequenceClassificationModel::load(dir.path(), &Device::Cpu) {
            Ok(_) => panic!("checkpoint should not load"),
            Err(e) => e.to_string(),
        }
    }

    #[test]
    fn test_class_names_prefers_id2label_in_index_order() {
        let config = head(
            r#"{"num_labels": 5, "id2label": {"2": "contradiction", "0": "entailment", "1": "neutral"}}"#,
        );
        assert_eq!(
            config.class_names(),
            vec!["entailment", "neutral", "contradiction"]
        );
    }

    #[test]
    fn test_class_names_falls_back_to_num_labels() {
        let config = head(r#"{"num_labels": 3}"#);
        assert_eq!(config.class_names(), vec!["LABEL_0", "LABEL_1", "LABEL_2"]);
    }

    #[test]
    fn test_class_names_defaults_to_two() {
        let config = head(r#"{"hidden_size": 768}"#);
        assert_eq!(config.class_names().len(), 2);
    }

    #[test]
    fn test_architecture_from_model_type() {
        assert_eq!(
            head(r#"{"model_type": "roberta"}"#).architecture(),
            Architecture::Roberta
        );
        assert_eq!(
            head(r#"{"model_type": "xlm-roberta"}"#).architecture(),
            Architecture::Roberta
        );
        assert_eq!(
            head(r#"{"model_type": "bert"}"#).architecture(),
            Architecture::Bert
        );
        assert_eq!(head("{}").architecture(), Architecture::Bert);
    }

    const TINY_BERT: &str = r#"{
        "model_type": "bert", "num_labels": 2, "vocab_size": 2, "hidden_size": 2,
        "num_hidden_layers": 1, "num_attention_heads": 1, "intermediate_size": 2,
        "hidden_act": "gelu", "hidden_dropout_prob": 0.0, "max_position_embeddings": 2,
        "type_vocab_size": 1, "initializer_range": 0.02, "layer_norm_eps": 1e-12,
        "pad_token_id": 0
    }"#;

    #[test]
    fn test_bert_config_rejects_roberta_weights() {
        let err = load_error(TINY_BERT, &[ROBERTA_EMBEDDINGS]);
        assert!(err.contains("model_type \"roberta\""), "{err}");
    }

    #[test]
    fn test_bert_config_rejects_roberta_head() {
        let err = load_error(
            TINY_BERT,
            &["bert.embeddings.word_embeddings.weight", ROBERTA_HEAD],
        );
        assert!(err.contains("RoBERTa weights"), "{err}");
    }

    #[test]
    fn test_roberta_config_requires_roberta_encoder() {
        let err = load_error(
            r#"{"model_type": "roberta", "num_labels": 2}"#,
            &["bert.embeddings.word_embeddings.weight"],
        );
        assert!(err.contains("no roberta.-prefixed encoder"), "{err}");
    }

    #[test]
    fn test_roberta_config_must_parse() {
        let err = load_error(
            r#"{"model_type": "roberta", "num_labels": 2}"#,
            &[ROBERTA_EMBEDDINGS],
        );
        assert!(err.contains("Failed to parse RoBERTa config"), "{err}");
    }
}
