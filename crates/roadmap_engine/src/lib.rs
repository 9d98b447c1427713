//! Roadmap engine: talks to the generation service and executes core effects.
mod client;
mod decode;
mod engine;
mod runner;
mod types;

pub use client::{ClientSettings, ReqwestRoadmapClient, RoadmapClient, DEFAULT_ENDPOINT};
pub use decode::decode_roadmap;
pub use engine::EngineHandle;
pub use runner::EffectRunner;
pub use types::{EngineEvent, FailureKind, FetchError, RequestId};
