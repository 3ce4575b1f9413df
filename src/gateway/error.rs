use std::time::Duration;

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::constants::{
    VERINEWS_STATUS_HEADER, VERINEWS_STATUS_INFERENCE_ERROR, VERINEWS_STATUS_INFERENCE_TIMEOUT,
    VERINEWS_STATUS_INVALID_REQUEST,
};
use crate::engine::EngineError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing, non-string or blank field, or an unparseable body.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Adapter error, panicked inference task, or scores the engine rejected.
    #[error("inference failed: {0}")]
    InferenceFailure(String),

    /// Inference did not finish within the configured bound.
    #[error("inference timed out after {} ms", .0.as_millis())]
    InferenceTimeout(Duration),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::InferenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InferenceTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Value of the `X-Verinews-Status` header for this error.
    pub fn status_tag(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => VERINEWS_STATUS_INVALID_REQUEST,
            GatewayError::InferenceFailure(_) => VERINEWS_STATUS_INFERENCE_ERROR,
            GatewayError::InferenceTimeout(_) => VERINEWS_STATUS_INFERENCE_TIMEOUT,
        }
    }
}

impl From<ModelError> for GatewayError {
    fn from(err: ModelError) -> Self {
        GatewayError::InferenceFailure(err.to_string())
    }
}

impl From<EngineError> for GatewayError {
    fn from(err: EngineError) -> Self {
        GatewayError::InferenceFailure(err.to_string())
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut headers = HeaderMap::new();
        headers.insert(
            VERINEWS_STATUS_HEADER,
            HeaderValue::from_static(self.status_tag()),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
