//! Navigation tree: the owning store of every explored node and the cache of
//! their drill-down results.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use engine_logging::{engine_debug, engine_info, engine_warn};
use thiserror::Error;

use crate::model::{Roadmap, Step};

/// Number of characters of the question kept in the root label.
pub const ROOT_LABEL_PREVIEW_CHARS: usize = 20;
pub const ROOT_DESCRIPTION: &str = "Main view";
const ROOT_MARKER: &str = "\u{1F3E0} ";
const ELLIPSIS: &str = "...";

/// Stable node identifier. Ids come from a counter that survives `create_root`,
/// so an id is never handed out twice by the same tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Unexpanded,
    Loading,
    Expanded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {0} already has a committed roadmap")]
    AlreadyCommitted(NodeId),
    #[error("parent chain of node {0} is broken")]
    BrokenParentChain(NodeId),
}

/// Outcome of activating a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation<'a> {
    /// The drill-down was fetched before; render it directly.
    Cached(&'a Roadmap),
    /// First visit: the caller must fetch `query` and commit the result.
    Fetch { query: String },
    /// A fetch for this node is already outstanding.
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    id: NodeId,
    label: String,
    description: String,
    step_id: Option<String>,
    question: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    child_roadmap: Option<Roadmap>,
    loading: bool,
}

impl TreeNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Id of the step this node was created from; `None` for the root.
    pub fn step_id(&self) -> Option<&str> {
        self.step_id.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_roadmap(&self) -> Option<&Roadmap> {
        self.child_roadmap.as_ref()
    }

    pub fn status(&self) -> NodeStatus {
        if self.child_roadmap.is_some() {
            NodeStatus::Expanded
        } else if self.loading {
            NodeStatus::Loading
        } else {
            NodeStatus::Unexpanded
        }
    }

    /// Question sent to the generation service when this node is drilled into.
    pub fn drill_down_query(&self) -> String {
        match &self.question {
            Some(question) => question.clone(),
            None => format!(
                "Step-by-step technical details for: \"{}\". Context: {}",
                self.label, self.description
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationTree {
    nodes: BTreeMap<NodeId, TreeNode>,
    step_index: HashMap<(NodeId, String), NodeId>,
    root: Option<NodeId>,
    active: Option<NodeId>,
    next_id: u64,
}

impl NavigationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// True while any node waits for its drill-down.
    pub fn has_pending_fetches(&self) -> bool {
        self.nodes.values().any(|node| node.loading)
    }

    /// Child of `parent` created from the step `step_id`.
    pub fn child_for_step(&self, parent: NodeId, step_id: &str) -> Option<NodeId> {
        self.step_index
            .get(&(parent, step_id.to_string()))
            .copied()
    }

    /// Drops every node and starts a fresh root for `question`, which becomes active.
    pub fn create_root(&mut self, question: &str) -> NodeId {
        let discarded = self.nodes.len();
        self.nodes.clear();
        self.step_index.clear();

        let id = self.allocate_id();
        self.nodes.insert(
            id,
            TreeNode {
                id,
                label: root_label(question),
                description: ROOT_DESCRIPTION.to_string(),
                step_id: None,
                question: Some(question.to_string()),
                parent: None,
                children: Vec::new(),
                child_roadmap: None,
                loading: false,
            },
        );
        self.root = Some(id);
        self.active = Some(id);
        engine_info!("New root {} (discarded {} nodes)", id, discarded);
        id
    }

    /// Appends one child per step under `parent`, in step order.
    ///
    /// Not idempotent: each call appends a new set. `commit_children` is the
    /// guarded entry point.
    pub fn materialize_children(
        &mut self,
        parent: NodeId,
        steps: &[Step],
    ) -> Result<Vec<NodeId>, TreeError> {
        if !self.nodes.contains_key(&parent) {
            return Err(TreeError::UnknownNode(parent));
        }

        let mut created = Vec::with_capacity(steps.len());
        for step in steps {
            let id = self.allocate_id();
            self.nodes.insert(
                id,
                TreeNode {
                    id,
                    label: step.label.clone(),
                    description: step.description.clone(),
                    step_id: Some(step.id.clone()),
                    question: None,
                    parent: Some(parent),
                    children: Vec::new(),
                    child_roadmap: None,
                    loading: false,
                },
            );
            // Duplicate step ids inside one roadmap resolve to the first step.
            self.step_index.entry((parent, step.id.clone())).or_insert(id);
            created.push(id);
        }

        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.extend_from_slice(&created);
        }
        Ok(created)
    }

    /// Moves focus to `id` and reports whether its drill-down is cached.
    ///
    /// A miss flips the node to `Loading`, so a second activation before the
    /// commit yields `InFlight` instead of another fetch.
    pub fn activate(&mut self, id: NodeId) -> Result<Activation<'_>, TreeError> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::UnknownNode(id))?;
        self.active = Some(id);

        let activation = match (&node.child_roadmap, node.loading) {
            (Some(roadmap), _) => {
                engine_debug!("Cache hit for {} ({})", id, node.label);
                Activation::Cached(roadmap)
            }
            (None, true) => {
                engine_debug!("Fetch already in flight for {}", id);
                Activation::InFlight
            }
            (None, false) => {
                node.loading = true;
                engine_debug!("Cache miss for {} ({})", id, node.label);
                Activation::Fetch {
                    query: node.drill_down_query(),
                }
            }
        };
        Ok(activation)
    }

    /// Stores the drill-down result of `id` and materializes its steps as children.
    ///
    /// Write-once: a node that already has a roadmap is left untouched.
    pub fn commit_children(
        &mut self,
        id: NodeId,
        roadmap: Roadmap,
    ) -> Result<Vec<NodeId>, TreeError> {
        let node = self.nodes.get(&id).ok_or(TreeError::UnknownNode(id))?;
        if node.child_roadmap.is_some() {
            engine_warn!("Rejected second commit for {} ({})", id, node.label);
            return Err(TreeError::AlreadyCommitted(id));
        }

        let created = self.materialize_children(id, roadmap.steps())?;
        let node = self.nodes.get_mut(&id).ok_or(TreeError::UnknownNode(id))?;
        node.child_roadmap = Some(roadmap);
        node.loading = false;
        engine_info!("Committed {} children under {}", created.len(), id);
        Ok(created)
    }

    /// Returns a loading node to `Unexpanded` after a failed fetch so it can be retried.
    pub fn mark_failed(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::UnknownNode(id))?;
        node.loading = false;
        Ok(())
    }

    /// Ancestor chain of `id`, root first.
    pub fn path_to(&self, id: NodeId) -> Result<Vec<&TreeNode>, TreeError> {
        let mut current = self.nodes.get(&id).ok_or(TreeError::UnknownNode(id))?;
        let mut path = vec![current];
        while let Some(parent) = current.parent {
            if path.len() >= self.nodes.len() {
                return Err(TreeError::BrokenParentChain(id));
            }
            current = self
                .nodes
                .get(&parent)
                .ok_or(TreeError::BrokenParentChain(id))?;
            path.push(current);
        }
        path.reverse();
        Ok(path)
    }

    fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}

fn root_label(question: &str) -> String {
    let mut chars = question.chars();
    let preview: String = chars.by_ref().take(ROOT_LABEL_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{ROOT_MARKER}{preview}{ELLIPSIS}")
    } else {
        format!("{ROOT_MARKER}{preview}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(ids: &[&str]) -> Vec<Step> {
        ids.iter()
            .map(|id| Step::new(*id, format!("Step {id}"), format!("About {id}")))
            .collect()
    }

    fn tree_with_children() -> (NavigationTree, NodeId, Vec<NodeId>) {
        let mut tree = NavigationTree::new();
        let root = tree.create_root("Learn X");
        let children = tree
            .commit_children(root, Roadmap::new("X", steps(&["1", "2", "3"])))
            .unwrap();
        (tree, root, children)
    }

    #[test]
    fn root_label_truncates_long_questions_only() {
        assert_eq!(root_label("Learn X"), format!("{ROOT_MARKER}Learn X"));
        assert_eq!(
            root_label("How do I define scope and expectations?"),
            format!("{ROOT_MARKER}How do I define scop...")
        );
        assert_eq!(
            root_label(&"ñ".repeat(ROOT_LABEL_PREVIEW_CHARS + 1)),
            format!("{ROOT_MARKER}{}...", "ñ".repeat(ROOT_LABEL_PREVIEW_CHARS))
        );
    }

    #[test]
    fn root_keeps_full_question_for_requests() {
        let mut tree = NavigationTree::new();
        let question = "How do I define scope and expectations?";
        let root = tree.create_root(question);
        assert_eq!(tree.node(root).unwrap().drill_down_query(), question);
    }

    #[test]
    fn path_to_root_is_root_only() {
        let (tree, root, _) = tree_with_children();
        let path = tree.path_to(root).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].id(), root);
    }

    #[test]
    fn path_length_is_depth_plus_one() {
        let (mut tree, root, children) = tree_with_children();
        let grandchildren = tree
            .commit_children(children[1], Roadmap::new("Detail", steps(&["a", "b"])))
            .unwrap();

        let path = tree.path_to(grandchildren[1]).unwrap();
        let ids: Vec<_> = path.iter().map(|node| node.id()).collect();
        assert_eq!(ids, vec![root, children[1], grandchildren[1]]);
    }

    #[test]
    fn path_to_detects_cycles() {
        let (mut tree, root, children) = tree_with_children();
        tree.nodes.get_mut(&root).unwrap().parent = Some(children[0]);
        assert_eq!(
            tree.path_to(children[0]),
            Err(TreeError::BrokenParentChain(children[0]))
        );
    }

    #[test]
    fn path_to_detects_missing_parent() {
        let (mut tree, _, children) = tree_with_children();
        tree.nodes.get_mut(&children[2]).unwrap().parent = Some(NodeId::from_raw(999));
        assert_eq!(
            tree.path_to(children[2]),
            Err(TreeError::BrokenParentChain(children[2]))
        );
    }

    #[test]
    fn second_commit_keeps_first_roadmap() {
        let (mut tree, _, children) = tree_with_children();
        let first = Roadmap::new("first", steps(&["a"]));
        let second = Roadmap::new("second", steps(&["b", "c"]));

        tree.commit_children(children[0], first.clone()).unwrap();
        assert_eq!(
            tree.commit_children(children[0], second),
            Err(TreeError::AlreadyCommitted(children[0]))
        );

        let node = tree.node(children[0]).unwrap();
        assert_eq!(node.child_roadmap(), Some(&first));
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn activation_walks_the_node_state_machine() {
        let (mut tree, _, children) = tree_with_children();
        let target = children[1];
        assert_eq!(tree.node(target).unwrap().status(), NodeStatus::Unexpanded);

        let query = match tree.activate(target).unwrap() {
            Activation::Fetch { query } => query,
            other => panic!("expected fetch, got {other:?}"),
        };
        assert_eq!(
            query,
            "Step-by-step technical details for: \"Step 2\". Context: About 2"
        );
        assert_eq!(tree.node(target).unwrap().status(), NodeStatus::Loading);
        assert_eq!(tree.activate(target).unwrap(), Activation::InFlight);

        tree.mark_failed(target).unwrap();
        assert_eq!(tree.node(target).unwrap().status(), NodeStatus::Unexpanded);
        assert!(matches!(
            tree.activate(target).unwrap(),
            Activation::Fetch { .. }
        ));

        let roadmap = Roadmap::new("Detail", steps(&["a", "b"]));
        tree.commit_children(target, roadmap.clone()).unwrap();
        assert_eq!(tree.node(target).unwrap().status(), NodeStatus::Expanded);
        assert_eq!(tree.activate(target).unwrap(), Activation::Cached(&roadmap));
    }

    #[test]
    fn activate_moves_focus_even_on_miss() {
        let (mut tree, _, children) = tree_with_children();
        tree.activate(children[2]).unwrap();
        assert_eq!(tree.active(), Some(children[2]));
    }

    #[test]
    fn activate_unknown_node_keeps_focus() {
        let (mut tree, root, _) = tree_with_children();
        let missing = NodeId::from_raw(42);
        assert_eq!(tree.activate(missing), Err(TreeError::UnknownNode(missing)));
        assert_eq!(tree.active(), Some(root));
    }

    #[test]
    fn create_root_discards_previous_tree() {
        let (mut tree, old_root, children) = tree_with_children();
        tree.commit_children(children[0], Roadmap::new("d", steps(&["a"])))
            .unwrap();
        assert_eq!(tree.len(), 5);

        let root = tree.create_root("new question");
        assert_eq!(tree.len(), 1);
        assert_ne!(root, old_root);
        assert!(tree.node(old_root).is_none());
        assert!(children.iter().all(|id| id.get() < root.get()));
        assert_eq!(tree.active(), Some(root));
        assert_eq!(tree.child_for_step(old_root, "1"), None);
    }

    #[test]
    fn child_for_step_resolves_by_parent_and_step_id() {
        let (mut tree, root, children) = tree_with_children();
        let nested = tree
            .commit_children(children[0], Roadmap::new("d", steps(&["1"])))
            .unwrap();

        assert_eq!(tree.child_for_step(root, "1"), Some(children[0]));
        assert_eq!(tree.child_for_step(children[0], "1"), Some(nested[0]));
        assert_eq!(tree.child_for_step(root, "missing"), None);
    }

    #[test]
    fn error_roadmap_commits_without_children() {
        let mut tree = NavigationTree::new();
        let root = tree.create_root("q");
        let created = tree
            .commit_children(root, Roadmap::error("nothing found"))
            .unwrap();
        assert!(created.is_empty());
        assert_eq!(tree.node(root).unwrap().status(), NodeStatus::Expanded);
    }

    #[test]
    fn materialize_rejects_unknown_parent() {
        let mut tree = NavigationTree::new();
        let missing = NodeId::from_raw(7);
        assert_eq!(
            tree.materialize_children(missing, &steps(&["1"])),
            Err(TreeError::UnknownNode(missing))
        );
    }
}
