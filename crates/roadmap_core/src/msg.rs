use crate::{NodeId, Roadmap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a new top-level question.
    QuerySubmitted(String),
    /// User clicked an entry of the sidebar tree.
    NodeActivated { node_id: NodeId },
    /// User double-clicked a main node of the displayed diagram.
    DiagramNodeActivated { step_id: String },
    /// User clicked a breadcrumb entry, including Home.
    BreadcrumbClicked { node_id: NodeId },
    /// Engine delivered the drill-down of a node.
    RoadmapLoaded { node_id: NodeId, roadmap: Roadmap },
    /// Engine could not fetch the drill-down of a node.
    RoadmapFailed { node_id: NodeId, reason: String },
    /// User closed the notice banner.
    NoticeDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
