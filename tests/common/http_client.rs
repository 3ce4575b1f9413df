//! HTTP client helpers for tests.

use std::time::Duration;

use serde::de::DeserializeOwned;

use verinews::constants::VERINEWS_STATUS_HEADER;
use verinews::gateway::{
    ClaimVerdictResponse, ErrorResponse, HealthResponse, ReadyResponse, RootResponse,
    TextVerdictResponse,
};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    /// Posts `{"text": ...}` to `/predict_text`. Returns the body and the
    /// `X-Verinews-Status` header.
    pub async fn predict_text(
        &self,
        text: &str,
    ) -> Result<(TextVerdictResponse, String), TestClientError> {
        self.post_json("/predict_text", &serde_json::json!({ "text": text }))
            .await
    }

    pub async fn verify_claim(
        &self,
        claim: &str,
        evidence: &str,
    ) -> Result<(ClaimVerdictResponse, String), TestClientError> {
        self.post_json(
            "/verify_claim",
            &serde_json::json!({ "claim": claim, "evidence": evidence }),
        )
        .await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<(T, String), TestClientError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;

        let status_header = resp
            .headers()
            .get(VERINEWS_STATUS_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let status = resp.status().as_u16();
        if status == 200 {
            return Ok((resp.json().await?, status_header));
        }

        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => Err(TestClientError::Api {
                status,
                status_header,
                error,
            }),
            Err(_) => Err(TestClientError::UnexpectedStatus(status, body)),
        }
    }

    pub async fn root(&self) -> Result<RootResponse, TestClientError> {
        self.get_json("/").await
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        self.get_json("/healthz").await
    }

    pub async fn ready(&self) -> Result<ReadyResponse, TestClientError> {
        self.get_json("/ready").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TestClientError> {
        let resp = self.client.get(self.url(path)).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0} - Body: {1}")]
    UnexpectedStatus(u16, String),

    #[error("API error {status} ({status_header}): {}", .error.error)]
    Api {
        status: u16,
        status_header: String,
        error: ErrorResponse,
    },
}

impl TestClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TestClientError::Api { status, .. } => Some(*status),
            TestClientError::UnexpectedStatus(status, _) => Some(*status),
            TestClientError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
        }
    }
}
