use crate::{Crumb, Diagram, LayoutOptions, NodeId, NodeStatus};

/// Banner text when the displayed node has no description.
pub const DEFAULT_CONTEXT_DESCRIPTION: &str = "Technical detail";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub sidebar: Vec<SidebarRow>,
    pub breadcrumbs: Vec<Crumb>,
    pub diagram: Option<Diagram>,
    pub context: Option<ContextBanner>,
    pub notice: Option<String>,
    pub loading: bool,
    pub layout: LayoutOptions,
    pub dirty: bool,
}

/// One visible entry of the sidebar tree, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    pub node_id: NodeId,
    pub label: String,
    pub depth: usize,
    pub status: NodeStatus,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBanner {
    pub title: String,
    pub description: String,
}
