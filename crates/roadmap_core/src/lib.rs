//! Roadmap explorer core: navigation tree, diagram conversion and the pure
//! state machine driving them.
mod breadcrumb;
mod diagram;
mod effect;
mod model;
mod msg;
mod state;
mod tree;
mod update;
mod view_model;

pub use breadcrumb::{resolve as resolve_breadcrumbs, Crumb, HOME_LABEL};
pub use diagram::{
    sub_node_id, to_drawable, Diagram, DrawEdge, DrawEdgeKind, DrawNode, DrawNodeKind,
    LayoutDirection, LayoutOptions, ERROR_NODE_ID,
};
pub use effect::Effect;
pub use model::{Roadmap, Step, ERROR_TITLE};
pub use msg::Msg;
pub use state::AppState;
pub use tree::{
    Activation, NavigationTree, NodeId, NodeStatus, TreeError, TreeNode, ROOT_DESCRIPTION,
    ROOT_LABEL_PREVIEW_CHARS,
};
pub use update::update;
pub use view_model::{AppViewModel, ContextBanner, SidebarRow, DEFAULT_CONTEXT_DESCRIPTION};
