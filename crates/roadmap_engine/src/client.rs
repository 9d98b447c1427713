use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use roadmap_core::Roadmap;

use crate::decode::{decode_roadmap, error_detail};
use crate::{FailureKind, FetchError};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/generate-roadmap";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Whole-request deadline. Generation can take long, so none by default.
    pub request_timeout: Option<Duration>,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait RoadmapClient: Send + Sync {
    /// Asks the generation service for a roadmap answering `question`.
    ///
    /// Inline domain errors come back as `Ok(Roadmap::Error { .. })`.
    async fn fetch_roadmap(&self, question: &str) -> Result<Roadmap, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestRoadmapClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestRoadmapClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Transport, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl RoadmapClient for ReqwestRoadmapClient {
    async fn fetch_roadmap(&self, question: &str) -> Result<Roadmap, FetchError> {
        let endpoint = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        let body = serde_json::json!({ "question": question }).to_string();
        engine_info!(
            "POST {} question_len={}",
            endpoint,
            question.chars().count()
        );

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = self
                .read_body(response)
                .await
                .ok()
                .and_then(|bytes| error_detail(&bytes));
            return Err(FetchError::new(
                FailureKind::ServerError {
                    status: status.as_u16(),
                },
                detail.unwrap_or_else(|| status.to_string()),
            ));
        }

        let bytes = self.read_body(response).await?;
        engine_debug!("Received {} bytes", bytes.len());
        decode_roadmap(&bytes)
    }
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Transport, err.to_string())
}
