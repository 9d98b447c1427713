use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};

use crate::client::{ClientSettings, ReqwestRoadmapClient, RoadmapClient};
use crate::{EngineEvent, FetchError, RequestId};

enum EngineCommand {
    Fetch {
        request_id: RequestId,
        question: String,
    },
}

pub(crate) type EventSource = Arc<Mutex<mpsc::Receiver<EngineEvent>>>;

/// Runs roadmap requests on a background tokio runtime.
///
/// Every enqueued request runs to completion and reports exactly one
/// `EngineEvent::FetchCompleted`; requests for different ids run concurrently.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: EventSource,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let client = ReqwestRoadmapClient::new(settings)?;
        Ok(Self::with_client(Arc::new(client)))
    }

    pub fn with_client(client: Arc<dyn RoadmapClient>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Could not start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, event_tx).await;
                });
            }
            engine_info!("Engine command channel closed");
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn enqueue(&self, request_id: RequestId, question: impl Into<String>) {
        let command = EngineCommand::Fetch {
            request_id,
            question: question.into(),
        };
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine stopped; dropping request {}", request_id);
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    pub(crate) fn event_source(&self) -> EventSource {
        self.event_rx.clone()
    }
}

async fn handle_command(
    client: &dyn RoadmapClient,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Fetch {
            request_id,
            question,
        } => {
            let result = client.fetch_roadmap(&question).await;
            let _ = event_tx.send(EngineEvent::FetchCompleted { request_id, result });
        }
    }
}
