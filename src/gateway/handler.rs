use std::any::Any;
use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::constants::{VERINEWS_STATUS_HEADER, VERINEWS_STATUS_OK};
use crate::engine::Verdict;
use crate::gateway::contract::{ClaimVerdictResponse, TextVerdictResponse};
use crate::gateway::error::GatewayError;
use crate::gateway::state::Pipeline;
use crate::gateway::validate::{validate_claim_request, validate_text_request};
use crate::model::ModelInput;

#[instrument(skip(pipeline, payload), fields(request_id = %Uuid::new_v4(), mode = "text"))]
pub async fn predict_text_handler(
    State(pipeline): State<Pipeline>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let body = json_body(payload)?;
    let request = validate_text_request(&body)?;
    debug!(text_len = request.text.len(), "Text request validated");

    let verdict = run_inference(&pipeline, ModelInput::single(request.text)).await?;

    info!(
        label = %verdict.label,
        confidence = verdict.confidence,
        degenerate = verdict.degenerate,
        "Text verdict"
    );

    Ok(ok_response(TextVerdictResponse::from_verdict(&verdict)))
}

#[instrument(skip(pipeline, payload), fields(request_id = %Uuid::new_v4(), mode = "claim"))]
pub async fn verify_claim_handler(
    State(pipeline): State<Pipeline>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let body = json_body(payload)?;
    let request = validate_claim_request(&body)?;
    debug!(
        claim_len = request.claim.len(),
        evidence_len = request.evidence.len(),
        "Claim request validated"
    );

    let verdict =
        run_inference(&pipeline, ModelInput::pair(request.claim, request.evidence)).await?;

    info!(
        verdict = %verdict.label,
        confidence = verdict.confidence,
        "Claim verdict"
    );

    Ok(ok_response(ClaimVerdictResponse::from_verdict(&verdict)))
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, GatewayError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))
}

/// Runs the classifier on a blocking thread under the configured timeout, then
/// resolves the logits into a [`Verdict`].
///
/// Every failure comes back as a single [`GatewayError`]; nothing is retried.
pub(crate) async fn run_inference(
    pipeline: &Pipeline,
    input: ModelInput,
) -> Result<Verdict, GatewayError> {
    let classifier = Arc::clone(&pipeline.classifier);
    let task = tokio::task::spawn_blocking(move || classifier.infer(&input));

    let timeout = pipeline.inference_timeout;
    let scores = match tokio::time::timeout(timeout, task).await {
        Err(_) => {
            error!(timeout_ms = timeout.as_millis() as u64, "Inference timed out");
            return Err(GatewayError::InferenceTimeout(timeout));
        }
        Ok(Err(join_err)) => {
            let reason = join_error_reason(join_err);
            error!(reason = %reason, "Inference task aborted");
            return Err(GatewayError::InferenceFailure(reason));
        }
        Ok(Ok(Err(model_err))) => {
            error!(error = %model_err, "Classifier returned an error");
            return Err(model_err.into());
        }
        Ok(Ok(Ok(scores))) => scores,
    };

    pipeline.engine.resolve(&scores).map_err(|e| {
        error!(
            error = %e,
            raw_scores = ?scores,
            shape = scores.len(),
            expected = pipeline.engine.scheme().class_count(),
            "Verdict resolution failed"
        );
        GatewayError::from(e)
    })
}

fn join_error_reason(err: JoinError) -> String {
    if err.is_panic() {
        format!("inference panicked: {}", panic_message(err.into_panic()))
    } else {
        "inference task was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

pub(crate) fn ok_response<T: Serialize>(body: T) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        VERINEWS_STATUS_HEADER,
        HeaderValue::from_static(VERINEWS_STATUS_OK),
    );
    (StatusCode::OK, headers, Json(body)).into_response()
}
