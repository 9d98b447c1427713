use serde::{Deserialize, Deserializer, Serialize};

/// Title the generation service uses for inline domain errors.
pub const ERROR_TITLE: &str = "Error";

/// One unit of a roadmap as returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub key_points: Vec<String>,
}

impl Step {
    pub fn new(id: impl Into<String>, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            key_points: Vec::new(),
        }
    }

    pub fn with_key_points<I, S>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_points = points.into_iter().map(Into::into).collect();
        self
    }
}

/// A generated plan, or the service's inline answer that it could not produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Roadmap {
    Steps { title: String, steps: Vec<Step> },
    Error { message: String },
}

impl Roadmap {
    pub fn new(title: impl Into<String>, steps: Vec<Step>) -> Self {
        Roadmap::Steps {
            title: title.into(),
            steps,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Roadmap::Error {
            message: message.into(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Roadmap::Steps { title, .. } => title,
            Roadmap::Error { .. } => ERROR_TITLE,
        }
    }

    /// Ordered steps; empty for the error variant.
    pub fn steps(&self) -> &[Step] {
        match self {
            Roadmap::Steps { steps, .. } => steps,
            Roadmap::Error { .. } => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Roadmap::Error { .. })
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
