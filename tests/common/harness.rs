//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use verinews::config::{Config, Endpoint};
use verinews::gateway::{AppState, Classifiers, create_router_with_state};
use verinews::labels::{FAKE_REAL_V1, NLI_VERDICT_V1};
use verinews::model::{MockBehavior, MockClassifier};

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    /// The only endpoint mounted; the other one has no model.
    pub endpoint: Endpoint,
    pub label_scheme: String,
    pub num_labels: usize,
    pub behavior: MockBehavior,
    pub allow_degenerate: bool,
    pub inference_timeout: Duration,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Text,
            label_scheme: FAKE_REAL_V1.to_string(),
            num_labels: 2,
            behavior: MockBehavior::Fixed(vec![0.1, 5.0]),
            allow_degenerate: false,
            inference_timeout: Duration::from_secs(5),
        }
    }
}

impl TestServerConfig {
    /// Serves `/verify_claim` from a three-class NLI model instead of text.
    pub fn claim() -> Self {
        Self {
            endpoint: Endpoint::Claim,
            ..Self::default()
        }
        .scheme(NLI_VERDICT_V1, 3)
    }

    pub fn scheme(mut self, label_scheme: &str, num_labels: usize) -> Self {
        self.label_scheme = label_scheme.to_string();
        self.num_labels = num_labels;
        self
    }

    pub fn behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn allow_degenerate(mut self) -> Self {
        self.allow_degenerate = true;
        self
    }

    pub fn inference_timeout(mut self, timeout: Duration) -> Self {
        self.inference_timeout = timeout;
        self
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub classifier: Arc<MockClassifier>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns the real axum server on an ephemeral port, backed by a
/// [`MockClassifier`] scripted through `config.behavior`.
///
/// The returned server exposes the mock so tests can count calls or swap
/// behavior between requests.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let classifier = Arc::new(MockClassifier::new(config.num_labels, config.behavior));

    let mut app_config = Config {
        allow_degenerate: config.allow_degenerate,
        inference_timeout: config.inference_timeout,
        ..Default::default()
    };
    match config.endpoint {
        Endpoint::Text => app_config.text.label_scheme = config.label_scheme,
        Endpoint::Claim => app_config.claim.label_scheme = config.label_scheme,
    }

    let classifiers = Classifiers::default().with(config.endpoint, classifier.clone());
    let state = AppState::build(classifiers, &app_config)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        classifier,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
