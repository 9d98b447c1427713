use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::{Activation, AppState, Effect, Msg, NodeId, Roadmap, TreeError};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::QuerySubmitted(raw) => {
            let question = raw.trim();
            if question.is_empty() {
                return (state, Vec::new());
            }
            let root = state.tree_mut().create_root(question);
            state.set_displayed(None);
            state.set_notice(None);
            state.mark_dirty();
            activate(&mut state, root)
        }
        Msg::NodeActivated { node_id } | Msg::BreadcrumbClicked { node_id } => {
            activate(&mut state, node_id)
        }
        Msg::DiagramNodeActivated { step_id } => {
            let target = state
                .displayed()
                .and_then(|shown| state.tree().child_for_step(shown, &step_id));
            match target {
                Some(node_id) => activate(&mut state, node_id),
                None => {
                    engine_warn!("Diagram node {:?} has no tree entry", step_id);
                    state.set_notice(Some(format!(
                        "\"{step_id}\" was not found in the navigation tree"
                    )));
                    state.mark_dirty();
                    Vec::new()
                }
            }
        }
        Msg::RoadmapLoaded { node_id, roadmap } => {
            apply_loaded(&mut state, node_id, roadmap);
            Vec::new()
        }
        Msg::RoadmapFailed { node_id, reason } => {
            apply_failed(&mut state, node_id, &reason);
            Vec::new()
        }
        Msg::NoticeDismissed => {
            if state.notice().is_some() {
                state.set_notice(None);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

enum Next {
    Show,
    Fetch(String),
    Wait,
}

fn activate(state: &mut AppState, node_id: NodeId) -> Vec<Effect> {
    let next = match state.tree_mut().activate(node_id) {
        Ok(Activation::Cached(_)) => Next::Show,
        Ok(Activation::Fetch { query }) => Next::Fetch(query),
        Ok(Activation::InFlight) => Next::Wait,
        Err(err) => {
            engine_warn!("Ignoring activation: {}", err);
            return Vec::new();
        }
    };

    state.mark_dirty();
    match next {
        Next::Show => {
            state.set_displayed(Some(node_id));
            Vec::new()
        }
        Next::Fetch(query) => {
            engine_info!("FetchRoadmap node={} query_len={}", node_id, query.len());
            vec![Effect::FetchRoadmap { node_id, query }]
        }
        Next::Wait => Vec::new(),
    }
}

fn apply_loaded(state: &mut AppState, node_id: NodeId, roadmap: Roadmap) {
    match state.tree_mut().commit_children(node_id, roadmap) {
        Ok(_) => {
            // A late result is stored but only shown if the user is still on its node.
            if state.tree().active() == Some(node_id) {
                state.set_displayed(Some(node_id));
            }
            state.mark_dirty();
        }
        Err(TreeError::UnknownNode(_)) => {
            engine_debug!("Dropping roadmap for discarded {}", node_id);
        }
        Err(err) => engine_warn!("Commit rejected: {}", err),
    }
}

fn apply_failed(state: &mut AppState, node_id: NodeId, reason: &str) {
    let label = match state.tree().node(node_id) {
        Some(node) => node.label().to_string(),
        None => {
            engine_debug!("Dropping failure for discarded {}", node_id);
            return;
        }
    };
    if let Err(err) = state.tree_mut().mark_failed(node_id) {
        engine_warn!("Could not reset {}: {}", node_id, err);
        return;
    }
    engine_warn!("Fetch for {} failed: {}", node_id, reason);
    state.set_notice(Some(format!("Could not load \"{label}\": {reason}")));
    state.mark_dirty();
}
