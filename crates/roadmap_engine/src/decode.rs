use roadmap_core::{Roadmap, Step, ERROR_TITLE};
use serde::Deserialize;

use crate::{FailureKind, FetchError};

/// Every shape the generation service answers with, success or not.
#[derive(Debug, Deserialize)]
struct RoadmapBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    steps: Option<Vec<Step>>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

/// Parses a generation response.
///
/// Inline domain errors (`{"title": "Error", "message": ..}` or `{"error": ..}`)
/// decode to `Roadmap::Error`; anything else without `steps` is malformed.
pub fn decode_roadmap(body: &[u8]) -> Result<Roadmap, FetchError> {
    let body: RoadmapBody = serde_json::from_slice(body)
        .map_err(|err| FetchError::new(FailureKind::MalformedResponse, err.to_string()))?;

    if body.title.as_deref() == Some(ERROR_TITLE) {
        if let Some(message) = body.message {
            return Ok(Roadmap::error(message));
        }
    }
    if let Some(message) = body.error {
        return Ok(Roadmap::error(message));
    }

    match body.steps {
        Some(steps) => Ok(Roadmap::new(body.title.unwrap_or_default(), steps)),
        None => Err(FetchError::new(
            FailureKind::MalformedResponse,
            "response has neither steps nor an error message",
        )),
    }
}

/// `detail` field of an error response, as the service reports failures.
pub(crate) fn error_detail(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorDetail>(body)
        .ok()
        .map(|error| error.detail)
}
