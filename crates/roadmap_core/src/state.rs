use engine_logging::engine_error;

use crate::breadcrumb::{self, Crumb};
use crate::diagram::{to_drawable, LayoutOptions};
use crate::tree::{NavigationTree, NodeId, NodeStatus};
use crate::view_model::{AppViewModel, ContextBanner, SidebarRow, DEFAULT_CONTEXT_DESCRIPTION};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    tree: NavigationTree,
    /// Node whose drill-down is on screen; lags `tree.active()` while a fetch runs.
    displayed: Option<NodeId>,
    notice: Option<String>,
    layout: LayoutOptions,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: LayoutOptions) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn tree(&self) -> &NavigationTree {
        &self.tree
    }

    pub fn displayed(&self) -> Option<NodeId> {
        self.displayed
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn view(&self) -> AppViewModel {
        let displayed = self.displayed.and_then(|id| self.tree.node(id));

        AppViewModel {
            sidebar: self.sidebar_rows(),
            breadcrumbs: self.breadcrumbs(),
            diagram: displayed
                .and_then(|node| node.child_roadmap())
                .map(to_drawable),
            context: displayed.map(|node| ContextBanner {
                title: node.label().to_string(),
                description: if node.description().is_empty() {
                    DEFAULT_CONTEXT_DESCRIPTION.to_string()
                } else {
                    node.description().to_string()
                },
            }),
            notice: self.notice.clone(),
            loading: self.tree.has_pending_fetches(),
            layout: self.layout,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn tree_mut(&mut self) -> &mut NavigationTree {
        &mut self.tree
    }

    pub(crate) fn set_displayed(&mut self, displayed: Option<NodeId>) {
        self.displayed = displayed;
    }

    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn breadcrumbs(&self) -> Vec<Crumb> {
        match breadcrumb::resolve(&self.tree, self.tree.active()) {
            Ok(crumbs) => crumbs,
            Err(err) => {
                engine_error!("Breadcrumbs unavailable: {}", err);
                Vec::new()
            }
        }
    }

    /// Pre-order walk below the root; children of unexpanded nodes stay hidden.
    fn sidebar_rows(&self) -> Vec<SidebarRow> {
        let mut rows = Vec::new();
        let Some(root) = self.tree.root().and_then(|id| self.tree.node(id)) else {
            return rows;
        };

        let mut stack: Vec<(NodeId, usize)> =
            root.children().iter().rev().map(|id| (*id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            let status = node.status();
            rows.push(SidebarRow {
                node_id: id,
                label: node.label().to_string(),
                depth,
                status,
                active: self.tree.active() == Some(id),
            });
            if status == NodeStatus::Expanded {
                stack.extend(node.children().iter().rev().map(|child| (*child, depth + 1)));
            }
        }
        rows
    }
}
