use crate::tree::{NavigationTree, NodeId, TreeError};

pub const HOME_LABEL: &str = "Home";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    /// Node re-activated when the crumb is clicked; `None` only for an empty tree.
    pub node_id: Option<NodeId>,
    pub label: String,
    pub is_home: bool,
    pub active: bool,
}

impl Crumb {
    fn home(node_id: Option<NodeId>, active: bool) -> Self {
        Self {
            node_id,
            label: HOME_LABEL.to_string(),
            is_home: true,
            active,
        }
    }
}

/// Breadcrumb trail for `active`. The root shows up as the `Home` entry, which
/// is also prepended when the path does not start at the root.
pub fn resolve(tree: &NavigationTree, active: Option<NodeId>) -> Result<Vec<Crumb>, TreeError> {
    let path = match active {
        Some(id) => tree.path_to(id)?,
        None => Vec::new(),
    };

    let mut crumbs = Vec::with_capacity(path.len() + 1);
    if !path.first().is_some_and(|node| node.is_root()) {
        crumbs.push(Crumb::home(tree.root(), false));
    }
    for node in path {
        let is_active = Some(node.id()) == active;
        if node.is_root() {
            crumbs.push(Crumb::home(Some(node.id()), is_active));
        } else {
            crumbs.push(Crumb {
                node_id: Some(node.id()),
                label: node.label().to_string(),
                is_home: false,
                active: is_active,
            });
        }
    }
    Ok(crumbs)
}
