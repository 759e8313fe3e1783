//! Event-driven refresh of independent panels.
//!
//! Lifecycle events go out on a broadcast channel. Every subscribed panel runs
//! its own task that fetches once at startup and again whenever an event it
//! cares about arrives. Triggers that land while a fetch is in flight collapse
//! into a single follow-up fetch, and the in-flight result is dropped because a
//! newer trigger has superseded it.

use crate::errors::FetchFailure;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshEvent {
    RecordingStarted,
    /// Recording stopped and the backend finished processing it.
    RecordingStopped,
}

/// A view that can pull fresh state and render it.
#[async_trait]
pub trait Panel: Send + Sync + 'static {
    type View: Send + 'static;

    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Self::View, FetchFailure>;

    fn apply(&self, view: Self::View);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Fetching,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelStatus {
    pub phase: Phase,
    pub fetches: u64,
    pub applied: u64,
    pub discarded: u64,
    pub failures: u64,
    pub last_error: Option<String>,
}

#[derive(Clone)]
pub struct RefreshCoordinator {
    events: broadcast::Sender<RefreshEvent>,
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { events }
    }

    pub fn publish(&self, event: RefreshEvent) {
        let receivers = self.events.send(event).unwrap_or(0);
        debug!(?event, receivers, "published refresh event");
    }

    /// Starts the panel's refresh task. The panel fetches once straight away,
    /// then again for every event in `interests`.
    pub fn subscribe<P: Panel>(&self, panel: Arc<P>, interests: &[RefreshEvent]) -> PanelHandle {
        let (status_tx, status_rx) = watch::channel(PanelStatus::default());
        let worker = Worker {
            panel,
            events: self.events.subscribe(),
            interests: interests.to_vec(),
            status: status_tx,
            closed: false,
        };
        tokio::spawn(worker.run());
        PanelHandle { status: status_rx }
    }
}

#[derive(Clone)]
pub struct PanelHandle {
    status: watch::Receiver<PanelStatus>,
}

impl PanelHandle {
    pub fn status(&self) -> PanelStatus {
        self.status.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<PanelStatus> {
        self.status.clone()
    }
}

struct Worker<P: Panel> {
    panel: Arc<P>,
    events: broadcast::Receiver<RefreshEvent>,
    interests: Vec<RefreshEvent>,
    status: watch::Sender<PanelStatus>,
    closed: bool,
}

impl<P: Panel> Worker<P> {
    async fn run(mut self) {
        let name = self.panel.name();
        // Cold start: one fetch regardless of events.
        let mut pending = true;

        loop {
            if !pending {
                if self.closed {
                    break;
                }
                match self.events.recv().await {
                    Ok(event) => pending = self.interested(event),
                    Err(broadcast::error::RecvError::Lagged(_)) => pending = true,
                    Err(broadcast::error::RecvError::Closed) => self.closed = true,
                }
                pending |= self.drain_queued();
                continue;
            }

            pending = false;
            self.status.send_modify(|status| {
                status.phase = Phase::Fetching;
                status.fetches += 1;
            });

            let outcome = {
                let fetch = self.panel.fetch();
                tokio::pin!(fetch);
                loop {
                    tokio::select! {
                        outcome = &mut fetch => break outcome,
                        event = self.events.recv(), if !self.closed => match event {
                            Ok(event) => pending |= self.interested(event),
                            Err(broadcast::error::RecvError::Lagged(_)) => pending = true,
                            Err(broadcast::error::RecvError::Closed) => self.closed = true,
                        },
                    }
                }
            };
            pending |= self.drain_queued();

            match outcome {
                Ok(_) if pending => {
                    debug!(panel = name, "discarding superseded fetch result");
                    self.status.send_modify(|status| {
                        status.phase = Phase::Idle;
                        status.discarded += 1;
                    });
                }
                Ok(view) => {
                    self.panel.apply(view);
                    self.status.send_modify(|status| {
                        status.phase = Phase::Idle;
                        status.applied += 1;
                        status.last_error = None;
                    });
                }
                Err(err) => {
                    warn!(panel = name, "refresh failed, keeping previous view: {err}");
                    self.status.send_modify(|status| {
                        status.phase = Phase::Idle;
                        status.failures += 1;
                        status.last_error = Some(err.to_string());
                    });
                }
            }
        }

        info!(panel = name, "refresh channel closed, panel task exiting");
    }

    fn interested(&self, event: RefreshEvent) -> bool {
        self.interests.contains(&event)
    }

    /// Consumes events already queued so a burst collapses into one fetch.
    fn drain_queued(&mut self) -> bool {
        let mut triggered = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => triggered |= self.interested(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => triggered = true,
                Err(broadcast::error::TryRecvError::Closed) => {
                    self.closed = true;
                    return triggered;
                }
                Err(broadcast::error::TryRecvError::Empty) => return triggered,
            }
        }
    }
}
