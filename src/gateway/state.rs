use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError, Endpoint};
use crate::engine::VerdictEngine;
use crate::model::SequenceClassifier;

/// Classifiers loaded at startup, one slot per endpoint.
#[derive(Clone, Default)]
pub struct Classifiers {
    pub text: Option<Arc<dyn SequenceClassifier>>,
    pub claim: Option<Arc<dyn SequenceClassifier>>,
}

impl Classifiers {
    pub fn with(mut self, endpoint: Endpoint, classifier: Arc<dyn SequenceClassifier>) -> Self {
        match endpoint {
            Endpoint::Text => self.text = Some(classifier),
            Endpoint::Claim => self.claim = Some(classifier),
        }
        self
    }

    pub fn get(&self, endpoint: Endpoint) -> Option<&Arc<dyn SequenceClassifier>> {
        match endpoint {
            Endpoint::Text => self.text.as_ref(),
            Endpoint::Claim => self.claim.as_ref(),
        }
    }
}

/// Model and resolved verdict engine behind one endpoint.
#[derive(Clone)]
pub struct Pipeline {
    pub endpoint: Endpoint,

    pub classifier: Arc<dyn SequenceClassifier>,

    pub engine: Arc<VerdictEngine>,

    pub inference_timeout: Duration,
}

/// Model identity reported by `/` and `/ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointReport {
    pub route: String,
    pub model: String,
    pub scheme: String,
    pub backend: String,
    pub num_labels: usize,
}

impl Pipeline {
    /// Checks the endpoint's scheme against the endpoint contract, then
    /// against the classifier's class count.
    pub fn build(
        endpoint: Endpoint,
        classifier: Arc<dyn SequenceClassifier>,
        config: &Config,
    ) -> Result<Self, ConfigError> {
        let scheme = config.pipeline(endpoint).label_scheme()?;
        endpoint.check_scheme(&scheme)?;
        let engine = VerdictEngine::new(scheme, classifier.num_labels(), config.allow_degenerate)?;

        Ok(Self {
            endpoint,
            classifier,
            engine: Arc::new(engine),
            inference_timeout: config.inference_timeout,
        })
    }

    pub fn model_id(&self) -> &str {
        self.classifier.model_id()
    }

    pub fn scheme_id(&self) -> String {
        self.engine.scheme().id().to_string()
    }

    pub fn report(&self) -> EndpointReport {
        EndpointReport {
            route: self.endpoint.route().to_string(),
            model: self.model_id().to_string(),
            scheme: self.scheme_id(),
            backend: self.classifier.backend().to_string(),
            num_labels: self.classifier.num_labels(),
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("endpoint", &self.endpoint)
            .field("model_id", &self.model_id())
            .field("scheme", &self.scheme_id())
            .field("inference_timeout", &self.inference_timeout)
            .finish()
    }
}

/// Process-wide, read-only handles shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub text: Option<Pipeline>,

    pub claim: Option<Pipeline>,

    pub cors_origins: Arc<[String]>,

    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    /// Builds a pipeline for every loaded classifier.
    ///
    /// Fails when no classifier was loaded, when a scheme does not parse, when
    /// it cannot be rendered by its endpoint, when its label count differs
    /// from the model's class count, or when a single-class model was not
    /// opted in.
    pub fn build(classifiers: Classifiers, config: &Config) -> Result<Self, ConfigError> {
        let build = |endpoint: Endpoint| {
            classifiers
                .get(endpoint)
                .map(|classifier| Pipeline::build(endpoint, Arc::clone(classifier), config))
                .transpose()
        };
        let text = build(Endpoint::Text)?;
        let claim = build(Endpoint::Claim)?;

        if text.is_none() && claim.is_none() {
            return Err(ConfigError::NoModelConfigured {
                text: Endpoint::Text.model_path_env(),
                claim: Endpoint::Claim.model_path_env(),
            });
        }

        Ok(Self {
            text,
            claim,
            cors_origins: config.cors_origins.clone().into(),
            loaded_at: Utc::now(),
        })
    }

    pub fn pipeline(&self, endpoint: Endpoint) -> Option<&Pipeline> {
        match endpoint {
            Endpoint::Text => self.text.as_ref(),
            Endpoint::Claim => self.claim.as_ref(),
        }
    }

    pub fn pipelines(&self) -> impl Iterator<Item = &Pipeline> {
        self.text.iter().chain(self.claim.iter())
    }
}
