//! Conversion of a roadmap into the node/edge set handed to the graph drawer.

use serde::Serialize;

use crate::model::{Roadmap, ERROR_TITLE};

pub const ERROR_NODE_ID: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawNodeKind {
    Main,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawEdgeKind {
    MainFlow,
    SubLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawNode {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: DrawNodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: DrawEdgeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Diagram {
    pub nodes: Vec<DrawNode>,
    pub edges: Vec<DrawEdge>,
}

impl Diagram {
    pub fn count_nodes(&self, kind: DrawNodeKind) -> usize {
        self.nodes.iter().filter(|node| node.kind == kind).count()
    }

    pub fn count_edges(&self, kind: DrawEdgeKind) -> usize {
        self.edges.iter().filter(|edge| edge.kind == kind).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayoutDirection {
    #[serde(rename = "LR")]
    LeftToRight,
    #[serde(rename = "TB")]
    TopToBottom,
}

/// Hierarchical layout hints for the drawing capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutOptions {
    pub direction: LayoutDirection,
    pub rank_separation: u32,
    pub node_separation: u32,
    pub padding: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::LeftToRight,
            rank_separation: 80,
            node_separation: 20,
            padding: 30,
        }
    }
}

/// Id of the `index`-th key point node under step `step_id`.
pub fn sub_node_id(step_id: &str, index: usize) -> String {
    format!("{step_id}_sub_{index}")
}

/// Builds the drawable elements of `roadmap`: one main node per step, one sub
/// node and sub-link per key point, and a main-flow edge between consecutive steps.
pub fn to_drawable(roadmap: &Roadmap) -> Diagram {
    let steps = match roadmap {
        Roadmap::Steps { steps, .. } => steps,
        Roadmap::Error { message } => {
            return Diagram {
                nodes: vec![DrawNode {
                    id: ERROR_NODE_ID.to_string(),
                    label: ERROR_TITLE.to_string(),
                    description: Some(message.clone()),
                    kind: DrawNodeKind::Main,
                }],
                edges: Vec::new(),
            };
        }
    };

    let mut diagram = Diagram::default();
    for (i, step) in steps.iter().enumerate() {
        diagram.nodes.push(DrawNode {
            id: step.id.clone(),
            label: step.label.clone(),
            description: Some(step.description.clone()),
            kind: DrawNodeKind::Main,
        });

        for (j, point) in step.key_points.iter().enumerate() {
            let sub_id = sub_node_id(&step.id, j);
            diagram.nodes.push(DrawNode {
                id: sub_id.clone(),
                label: point.clone(),
                description: None,
                kind: DrawNodeKind::Sub,
            });
            diagram.edges.push(DrawEdge {
                source: step.id.clone(),
                target: sub_id,
                kind: DrawEdgeKind::SubLink,
            });
        }

        if let Some(next) = steps.get(i + 1) {
            diagram.edges.push(DrawEdge {
                source: step.id.clone(),
                target: next.id.clone(),
                kind: DrawEdgeKind::MainFlow,
            });
        }
    }
    diagram
}
