use crate::calendar::CalendarController;
use crate::date_key::DateKey;
use crate::panels::{AnalysisPanel, SuggestionsPanel};
use crate::recorder::{Recorder, RecordingBackend};
use crate::refresh::{PanelHandle, RefreshCoordinator, RefreshEvent};
use crate::snapshot::SnapshotSource;
use crate::storage::RecordStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub records: RecordStore,
    pub calendar: Arc<Mutex<CalendarController>>,
    pub recorder: Recorder,
    pub source: Arc<dyn SnapshotSource>,
    pub analysis: Arc<AnalysisPanel>,
    pub analysis_status: PanelHandle,
    pub suggestions: Arc<SuggestionsPanel>,
    pub suggestions_status: PanelHandle,
}

impl AppState {
    /// Wires the panels to the coordinator and starts their refresh tasks,
    /// so it must be called inside a tokio runtime.
    pub fn new(
        records: RecordStore,
        source: Arc<dyn SnapshotSource>,
        recording: Arc<dyn RecordingBackend>,
    ) -> Self {
        let coordinator = RefreshCoordinator::new();

        let analysis = Arc::new(AnalysisPanel::new(source.clone()));
        let analysis_status =
            coordinator.subscribe(analysis.clone(), &[RefreshEvent::RecordingStopped]);

        let suggestions = Arc::new(SuggestionsPanel::new(source.clone()));
        let suggestions_status =
            coordinator.subscribe(suggestions.clone(), &[RefreshEvent::RecordingStopped]);

        Self {
            records,
            calendar: Arc::new(Mutex::new(CalendarController::starting_at(DateKey::today()))),
            recorder: Recorder::new(recording, coordinator),
            source,
            analysis,
            analysis_status,
            suggestions,
            suggestions_status,
        }
    }
}
