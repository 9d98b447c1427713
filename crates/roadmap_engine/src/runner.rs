use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use roadmap_core::{Effect, Msg, NodeId};

use crate::{EngineEvent, EngineHandle};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Executes core effects on the engine and turns engine events back into `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchRoadmap { node_id, query } => {
                    engine_info!("FetchRoadmap node={} query_len={}", node_id, query.len());
                    self.engine.enqueue(node_id.get(), query);
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let events = self.engine.event_source();
        thread::spawn(move || loop {
            let received = match events.lock() {
                Ok(rx) => rx.recv_timeout(POLL_INTERVAL),
                Err(_) => break,
            };
            match received {
                Ok(event) => {
                    if msg_tx.send(to_msg(event)).is_err() {
                        engine_debug!("Message receiver dropped; stopping event loop");
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        });
    }
}

fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::FetchCompleted { request_id, result } => {
            let node_id = NodeId::from_raw(request_id);
            match result {
                Ok(roadmap) => Msg::RoadmapLoaded { node_id, roadmap },
                Err(err) => {
                    engine_warn!("Fetch for {} failed: {}", node_id, err);
                    Msg::RoadmapFailed {
                        node_id,
                        reason: err.to_string(),
                    }
                }
            }
        }
    }
}
