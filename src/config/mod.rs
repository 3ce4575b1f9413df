//! Environment-backed configuration.
//!
//! Each endpoint is served by its own model and label scheme:
//!
//! - `/predict_text` reads `VERINEWS_TEXT_*` (binary fake/real model).
//! - `/verify_claim` reads `VERINEWS_CLAIM_*` (three-way NLI model).
//!
//! An endpoint is enabled when its `*_MODEL_PATH` is set; at least one must be.
//! Everything else has a default.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_CORS_ORIGIN, DEFAULT_INFERENCE_TIMEOUT_MS, DEFAULT_PORT, DEFAULT_TEXT_MODEL_ID,
};
use crate::labels::{FAKE_REAL_V1, LabelScheme, NLI_VERDICT_V1, SchemeKind};
use crate::model::ClassifierConfig;

/// Request mode, each backed by its own classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    /// `POST /predict_text`, rendered with the text contract.
    Text,
    /// `POST /verify_claim`, rendered with the claim contract.
    Claim,
}

struct PipelineEnv {
    model_path: &'static str,
    model_id: &'static str,
    label_scheme: &'static str,
    labels: &'static str,
}

const TEXT_ENV: PipelineEnv = PipelineEnv {
    model_path: "VERINEWS_TEXT_MODEL_PATH",
    model_id: "VERINEWS_TEXT_MODEL_ID",
    label_scheme: "VERINEWS_TEXT_LABEL_SCHEME",
    labels: "VERINEWS_TEXT_LABELS",
};

const CLAIM_ENV: PipelineEnv = PipelineEnv {
    model_path: "VERINEWS_CLAIM_MODEL_PATH",
    model_id: "VERINEWS_CLAIM_MODEL_ID",
    label_scheme: "VERINEWS_CLAIM_LABEL_SCHEME",
    labels: "VERINEWS_CLAIM_LABELS",
};

impl Endpoint {
    pub const ALL: [Endpoint; 2] = [Endpoint::Text, Endpoint::Claim];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Text => "text",
            Endpoint::Claim => "claim",
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            Endpoint::Text => "/predict_text",
            Endpoint::Claim => "/verify_claim",
        }
    }

    pub fn default_scheme(&self) -> &'static str {
        match self {
            Endpoint::Text => FAKE_REAL_V1,
            Endpoint::Claim => NLI_VERDICT_V1,
        }
    }

    /// Text verdicts are two-way (or an opted-in single class); claim verdicts
    /// are three-way.
    pub fn accepts(&self, kind: SchemeKind) -> bool {
        match self {
            Endpoint::Text => matches!(kind, SchemeKind::Binary | SchemeKind::Degenerate),
            Endpoint::Claim => kind == SchemeKind::Ternary,
        }
    }

    /// Fails when `scheme` cannot be rendered by this endpoint's contract.
    pub fn check_scheme(&self, scheme: &LabelScheme) -> Result<(), ConfigError> {
        if self.accepts(scheme.kind()) {
            return Ok(());
        }
        Err(ConfigError::SchemeNotAllowed {
            route: self.route(),
            scheme: scheme.id().to_string(),
            kind: scheme.kind().as_str(),
            expected: match self {
                Endpoint::Text => "binary or degenerate",
                Endpoint::Claim => "ternary",
            },
        })
    }

    pub fn model_path_env(&self) -> &'static str {
        self.env().model_path
    }

    fn env(&self) -> &'static PipelineEnv {
        match self {
            Endpoint::Text => &TEXT_ENV,
            Endpoint::Claim => &CLAIM_ENV,
        }
    }
}

/// Model and label scheme behind one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Model directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    /// The endpoint is disabled when unset.
    pub model_path: Option<PathBuf>,

    /// Identifier reported by `/` and `/ready`. Defaults to the directory name.
    pub model_id: Option<String>,

    /// Versioned label scheme id, e.g. `fake-real@v1`.
    pub label_scheme: String,

    /// Explicit labels for `custom@*` schemes, in score order.
    pub labels: Option<Vec<String>>,
}

impl PipelineConfig {
    pub fn defaults(endpoint: Endpoint) -> Self {
        Self {
            model_path: None,
            model_id: match endpoint {
                Endpoint::Text => Some(DEFAULT_TEXT_MODEL_ID.to_string()),
                Endpoint::Claim => None,
            },
            label_scheme: endpoint.default_scheme().to_string(),
            labels: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.model_path.is_some()
    }

    /// Builds the configured [`LabelScheme`].
    pub fn label_scheme(&self) -> Result<LabelScheme, ConfigError> {
        Ok(LabelScheme::from_config(
            &self.label_scheme,
            self.labels.as_deref(),
        )?)
    }

    fn from_env(endpoint: Endpoint) -> Self {
        let defaults = Self::defaults(endpoint);
        let names = endpoint.env();

        Self {
            model_path: Config::parse_optional_path_from_env(names.model_path),
            model_id: Config::parse_optional_string_from_env(names.model_id)
                .or(defaults.model_id),
            label_scheme: Config::parse_optional_string_from_env(names.label_scheme)
                .unwrap_or(defaults.label_scheme),
            labels: Config::parse_list_from_env(names.labels),
        }
    }

    fn resolved_model_id(&self, path: &Path) -> String {
        self.model_id.clone().unwrap_or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        })
    }
}

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `VERINEWS_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Model behind `/predict_text`.
    pub text: PipelineConfig,

    /// Model behind `/verify_claim`.
    pub claim: PipelineConfig,

    /// Serve single-class text models (verdicts flagged degenerate). Default: `false`.
    pub allow_degenerate: bool,

    /// Per-request inference bound. Default: 30s.
    pub inference_timeout: Duration,

    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            text: PipelineConfig::defaults(Endpoint::Text),
            claim: PipelineConfig::defaults(Endpoint::Claim),
            allow_degenerate: false,
            inference_timeout: Duration::from_millis(DEFAULT_INFERENCE_TIMEOUT_MS),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "VERINEWS_PORT";
    pub const ENV_BIND_ADDR: &'static str = "VERINEWS_BIND_ADDR";
    pub const ENV_ALLOW_DEGENERATE: &'static str = "VERINEWS_ALLOW_DEGENERATE";
    pub const ENV_INFERENCE_TIMEOUT_MS: &'static str = "VERINEWS_INFERENCE_TIMEOUT_MS";
    pub const ENV_CORS_ORIGINS: &'static str = "VERINEWS_CORS_ORIGINS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let allow_degenerate =
            Self::parse_bool_from_env(Self::ENV_ALLOW_DEGENERATE, defaults.allow_degenerate)?;
        let inference_timeout = Self::parse_timeout_from_env(defaults.inference_timeout)?;
        let cors_origins =
            Self::parse_list_from_env(Self::ENV_CORS_ORIGINS).unwrap_or(defaults.cors_origins);

        Ok(Self {
            port,
            bind_addr,
            text: PipelineConfig::from_env(Endpoint::Text),
            claim: PipelineConfig::from_env(Endpoint::Claim),
            allow_degenerate,
            inference_timeout,
            cors_origins,
        })
    }

    pub fn pipeline(&self, endpoint: Endpoint) -> &PipelineConfig {
        match endpoint {
            Endpoint::Text => &self.text,
            Endpoint::Claim => &self.claim,
        }
    }

    /// Endpoints whose model path is set.
    pub fn enabled_endpoints(&self) -> Vec<Endpoint> {
        Endpoint::ALL
            .into_iter()
            .filter(|endpoint| self.pipeline(*endpoint).is_enabled())
            .collect()
    }

    /// Validates model directories, label schemes and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let enabled = self.enabled_endpoints();
        if enabled.is_empty() {
            return Err(ConfigError::NoModelConfigured {
                text: TEXT_ENV.model_path,
                claim: CLAIM_ENV.model_path,
            });
        }

        for endpoint in enabled {
            let pipeline = self.pipeline(endpoint);
            if let Some(path) = &pipeline.model_path {
                Self::validate_model_dir(path)?;
            }
            endpoint.check_scheme(&pipeline.label_scheme()?)?;
        }

        if self.inference_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Classifier settings for `endpoint`.
    pub fn classifier_config(&self, endpoint: Endpoint) -> Result<ClassifierConfig, ConfigError> {
        let pipeline = self.pipeline(endpoint);
        let path = pipeline
            .model_path
            .clone()
            .ok_or(ConfigError::MissingEnvVar {
                name: endpoint.model_path_env(),
            })?;
        let model_id = pipeline.resolved_model_id(&path);
        Ok(ClassifierConfig::new(path, model_id))
    }

    /// Address the HTTP listener binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    fn validate_model_dir(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            let file = path.join(required);
            if !file.is_file() {
                return Err(ConfigError::MissingModelFile { path: file });
            }
        }
        Ok(())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_timeout_from_env(default: Duration) -> Result<Duration, ConfigError> {
        match env::var(Self::ENV_INFERENCE_TIMEOUT_MS) {
            Ok(value) => match value.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
                _ => Err(ConfigError::InvalidTimeout { value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" | "" => Ok(false),
                _ => Err(ConfigError::InvalidBool { name, value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_list_from_env(var_name: &str) -> Option<Vec<String>> {
        let items: Vec<String> = env::var(var_name)
            .ok()?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if items.is_empty() { None } else { Some(items) }
    }
}
