use crate::errors::FetchFailure;
use crate::models::{Emotion, SleepStages, Suggestion};
use crate::recommendations::parse_suggestions;
use crate::refresh::Panel;
use crate::snapshot::{ResultsSnapshot, SnapshotSource};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// Latest sentiment and biometric readings. Fields stay `None` until a
/// snapshot has supplied them, which the dashboard shows as "no data".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisView {
    pub emotion: Option<Emotion>,
    pub heart_rate: Option<i64>,
    pub steps: Option<i64>,
    pub sleep: Option<SleepStages>,
    pub summary: Option<String>,
}

pub struct AnalysisPanel {
    source: Arc<dyn SnapshotSource>,
    view: RwLock<AnalysisView>,
}

impl AnalysisPanel {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            source,
            view: RwLock::new(AnalysisView::default()),
        }
    }

    pub fn view(&self) -> AnalysisView {
        self.view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Panel for AnalysisPanel {
    type View = ResultsSnapshot;

    fn name(&self) -> &'static str {
        "analysis"
    }

    async fn fetch(&self) -> Result<ResultsSnapshot, FetchFailure> {
        self.source.fetch_snapshot().await
    }

    fn apply(&self, snapshot: ResultsSnapshot) {
        // Poisoned or not, the next snapshot overwrites whatever is there.
        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);

        // A snapshot without sentiment keeps the last label on screen.
        if let Some(emotion) = snapshot.emotion() {
            view.emotion = Some(emotion);
        }
        if let Some(summary) = snapshot.summary() {
            view.summary = Some(summary.to_string());
        }
        if let Some(fitbit) = snapshot.fitbit_results.clone() {
            view.heart_rate = fitbit.heart.and_then(|heart| heart.resting_heart_rate);
            view.steps = fitbit.activity.and_then(|activity| activity.steps);
            view.sleep = match fitbit.sleep {
                Some(_) => snapshot
                    .to_partial_record()
                    .normalize()
                    .ok()
                    .map(|patch| SleepStages {
                        deep: patch.deep_sleep.unwrap_or(0),
                        light: patch.light_sleep.unwrap_or(0),
                        rem: patch.rem_sleep.unwrap_or(0),
                        awake: patch.awake.unwrap_or(0),
                    }),
                None => None,
            };
        }
    }
}

pub struct SuggestionsPanel {
    source: Arc<dyn SnapshotSource>,
    suggestions: RwLock<Vec<Suggestion>>,
}

impl SuggestionsPanel {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            source,
            suggestions: RwLock::new(Vec::new()),
        }
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.suggestions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Panel for SuggestionsPanel {
    /// `None` when the snapshot carried no recommendation text at all.
    type View = Option<Vec<Suggestion>>;

    fn name(&self) -> &'static str {
        "suggestions"
    }

    async fn fetch(&self) -> Result<Self::View, FetchFailure> {
        let snapshot = self.source.fetch_snapshot().await?;
        Ok(snapshot.recommendations.as_deref().map(parse_suggestions))
    }

    fn apply(&self, parsed: Self::View) {
        let Some(parsed) = parsed else {
            return;
        };
        *self
            .suggestions
            .write()
            .unwrap_or_else(PoisonError::into_inner) = parsed;
    }
}
