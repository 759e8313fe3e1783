use crate::errors::FetchFailure;
use crate::refresh::{RefreshCoordinator, RefreshEvent};
use crate::snapshot::AnalysisBackend;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

#[async_trait]
pub trait RecordingBackend: Send + Sync + 'static {
    async fn start_recording(&self) -> Result<(), FetchFailure>;

    /// Must only succeed once processing of the recording is complete.
    async fn stop_recording(&self) -> Result<(), FetchFailure>;
}

#[async_trait]
impl RecordingBackend for AnalysisBackend {
    async fn start_recording(&self) -> Result<(), FetchFailure> {
        AnalysisBackend::start_recording(self).await
    }

    async fn stop_recording(&self) -> Result<(), FetchFailure> {
        AnalysisBackend::stop_recording(self).await
    }
}

/// Drives the recording lifecycle and announces it to subscribed panels.
/// Nothing is published when the backend call fails.
#[derive(Clone)]
pub struct Recorder {
    backend: Arc<dyn RecordingBackend>,
    coordinator: RefreshCoordinator,
}

impl Recorder {
    pub fn new(backend: Arc<dyn RecordingBackend>, coordinator: RefreshCoordinator) -> Self {
        Self {
            backend,
            coordinator,
        }
    }

    pub async fn start(&self) -> Result<(), FetchFailure> {
        self.backend.start_recording().await.inspect_err(|err| {
            warn!("start recording failed: {err}");
        })?;
        info!("recording started");
        self.coordinator.publish(RefreshEvent::RecordingStarted);
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), FetchFailure> {
        self.backend.stop_recording().await.inspect_err(|err| {
            warn!("stop recording failed, panels will not refresh: {err}");
        })?;
        info!("recording stopped and processed");
        self.coordinator.publish(RefreshEvent::RecordingStopped);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::{Panel, PanelHandle};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeBackend {
        fail_stop: AtomicBool,
    }

    #[async_trait]
    impl RecordingBackend for FakeBackend {
        async fn start_recording(&self) -> Result<(), FetchFailure> {
            Ok(())
        }

        async fn stop_recording(&self) -> Result<(), FetchFailure> {
            if self.fail_stop.load(Ordering::SeqCst) {
                return Err(FetchFailure::Rejected {
                    url: "http://backend/stop-recording".into(),
                    message: "Failed to stop recording".into(),
                });
            }
            Ok(())
        }
    }

    struct CountingPanel {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl Panel for CountingPanel {
        type View = ();

        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch(&self) -> Result<(), FetchFailure> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn apply(&self, _view: ()) {}
    }

    async fn settled(handle: &PanelHandle, applied: u64) {
        let mut rx = handle.watch();
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| s.applied == applied))
            .await
            .expect("panel did not settle")
            .expect("panel task ended");
    }

    #[tokio::test]
    async fn failed_stop_publishes_nothing() {
        let coordinator = RefreshCoordinator::new();
        let backend = Arc::new(FakeBackend {
            fail_stop: AtomicBool::new(true),
        });
        let recorder = Recorder::new(backend.clone(), coordinator.clone());
        let panel = Arc::new(CountingPanel {
            fetches: AtomicUsize::new(0),
        });
        let handle = coordinator.subscribe(panel.clone(), &[RefreshEvent::RecordingStopped]);
        settled(&handle, 1).await;

        recorder.start().await.unwrap();
        assert!(recorder.stop().await.is_err());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(panel.fetches.load(Ordering::SeqCst), 1);

        backend.fail_stop.store(false, Ordering::SeqCst);
        recorder.stop().await.unwrap();
        settled(&handle, 2).await;
        assert_eq!(panel.fetches.load(Ordering::SeqCst), 2);
    }
}
