//! Cross-cutting, shared constants.

/// Maximum tokenized sequence length fed to the classifier.
pub const MAX_SEQ_LEN: usize = 512;

/// Text model identifier reported when `VERINEWS_TEXT_MODEL_ID` is unset.
pub const DEFAULT_TEXT_MODEL_ID: &str = "Rishika08/verinews-roberta";

/// Default per-request inference bound.
pub const DEFAULT_INFERENCE_TIMEOUT_MS: u64 = 30_000;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// Origin of the bundled web frontend.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Tolerance used when checking that a probability distribution sums to one.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Decimal places kept when rendering confidences as percentages.
pub const PERCENT_DECIMALS: i32 = 2;

pub const VERINEWS_STATUS_HEADER: &str = "X-Verinews-Status";
pub const VERINEWS_STATUS_OK: &str = "ok";
pub const VERINEWS_STATUS_INVALID_REQUEST: &str = "invalid_request";
pub const VERINEWS_STATUS_INFERENCE_ERROR: &str = "inference_error";
pub const VERINEWS_STATUS_INFERENCE_TIMEOUT: &str = "inference_timeout";
