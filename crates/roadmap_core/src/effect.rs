use crate::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the generation service for the drill-down of `node_id`.
    FetchRoadmap { node_id: NodeId, query: String },
}
