//! SciStream Client
//!
//! One method per task type, each hiding the submit-then-stream protocol
//! behind a single lazy [`EventStream`]: the task is POSTed to its
//! endpoint, the returned handle is used to attach to the engine's event
//! feed, and the caller only ever sees the resulting event sequence.

use crate::config::ClientConfig;
use crate::error::{Result, SdkError};
use crate::files::{FileLoader, FsFileLoader, ImageCompressor};
use crate::request::{compose_payload, TaskRequest};
use crate::stream::EventStream;
use crate::types::TaskId;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub(crate) const CHAT_ENDPOINT: &str = "/chat/";
pub(crate) const RESEARCH_ENDPOINT: &str = "/research/";
pub(crate) const HYPOTHESES_ENDPOINT: &str = "/hypotheses/";

/// Failures on the way to an accepted task.
///
/// Never raised to the caller; folded into the event sequence as one
/// terminal error event.
#[derive(Debug, Error)]
pub(crate) enum InitiationError {
    #[error("connection error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("task rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("engine accepted the task but returned no task_id")]
    MissingTaskId,
}

#[derive(Debug, Deserialize)]
struct AcceptedTask {
    #[serde(default)]
    task_id: Option<TaskId>,
}

/// Client for the SciStream engine.
///
/// Built once and reused; holds no per-task state, so concurrent task
/// invocations on the same client are independent.
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt;
/// use scistream_sdk::{ClientConfig, SciStreamClient, TaskRequest};
///
/// # async fn example() -> scistream_sdk::Result<()> {
/// let client = SciStreamClient::new(ClientConfig::new("http://127.0.0.1:8000"))?;
/// let mut events = client
///     .chat(TaskRequest::new("user-1", "session-1").content("hello"))
///     .await?;
/// while let Some(event) = events.next().await {
///     println!("{}: {:?}", event.status, event.message);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SciStreamClient {
    http: reqwest::Client,
    config: ClientConfig,
    loader: Arc<dyn FileLoader>,
    compressor: Option<Arc<dyn ImageCompressor>>,
}

impl SciStreamClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        // No client-wide timeout: it would also cap the event stream. The
        // initiation timeout is applied per request instead.
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SdkError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            config,
            loader: Arc::new(FsFileLoader),
            compressor: None,
        })
    }

    /// Replace the loader used to resolve path attachments.
    pub fn with_file_loader(mut self, loader: Arc<dyn FileLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Install an image compressor. Without one, image attachments are
    /// uploaded uncompressed regardless of the image policy.
    pub fn with_image_compressor(mut self, compressor: Arc<dyn ImageCompressor>) -> Self {
        self.compressor = Some(compressor);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a `/chat/` task and return its event sequence.
    ///
    /// Validation problems (bad descriptors, too many files, unreadable
    /// paths) are the only errors raised here. Everything later, from a
    /// refused connection to a mid-stream drop, arrives as the final event
    /// of the returned stream.
    pub async fn chat(&self, request: TaskRequest) -> Result<EventStream> {
        self.run_task(CHAT_ENDPOINT, request).await
    }

    /// Start a `/research/` task and return its event sequence.
    pub async fn research(&self, request: TaskRequest) -> Result<EventStream> {
        self.run_task(RESEARCH_ENDPOINT, request).await
    }

    /// Start a `/hypotheses/` task and return its event sequence.
    pub async fn hypotheses(&self, request: TaskRequest) -> Result<EventStream> {
        self.run_task(HYPOTHESES_ENDPOINT, request).await
    }

    async fn run_task(&self, endpoint: &str, request: TaskRequest) -> Result<EventStream> {
        let payload = compose_payload(
            &request,
            self.loader.as_ref(),
            self.compressor.as_deref(),
            &self.config.image,
        )
        .await?;
        info!(
            target: "scistream.client",
            endpoint,
            user_id = %request.user_id,
            session_id = %request.session_id,
            "starting task"
        );
        Ok(crate::stream::run_task(
            self.http.clone(),
            self.config.clone(),
            endpoint.to_string(),
            payload,
        ))
    }
}

/// Phase one of the protocol: POST the payload, expect `202 Accepted` with
/// a non-empty `task_id`. Anything else, including a generic 2xx, is an
/// initiation failure.
pub(crate) async fn initiate_task(
    http: &reqwest::Client,
    config: &ClientConfig,
    endpoint: &str,
    payload: &serde_json::Value,
) -> std::result::Result<TaskId, InitiationError> {
    let url = format!("{}{}", config.base_url, endpoint);
    info!(target: "scistream.client", %url, "initiating task");

    let response = http
        .post(&url)
        .json(payload)
        .timeout(config.request_timeout)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::ACCEPTED {
        let body = response.text().await.unwrap_or_default();
        return Err(InitiationError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let accepted: AcceptedTask = response.json().await?;
    match accepted.task_id {
        Some(task_id) if !task_id.is_empty() => {
            info!(target: "scistream.client", %task_id, "task accepted");
            Ok(task_id)
        }
        _ => Err(InitiationError::MissingTaskId),
    }
}
