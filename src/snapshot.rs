//! The analysis backend's combined results and the HTTP client that talks to it.

use crate::errors::FetchFailure;
use crate::models::{DurationInput, Emotion, PartialDayRecord};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsSnapshot {
    #[serde(default)]
    pub audio_results: Option<AudioResults>,
    #[serde(default)]
    pub fitbit_results: Option<FitbitResults>,
    #[serde(default)]
    pub recommendations: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioResults {
    #[serde(default)]
    pub sentiment: Option<Vec<SentimentEntry>>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentEntry {
    pub sentiment: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitbitResults {
    #[serde(default)]
    pub heart: Option<HeartSummary>,
    #[serde(default)]
    pub activity: Option<ActivitySummary>,
    #[serde(default)]
    pub sleep: Option<SleepSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartSummary {
    #[serde(default, rename = "restingHeartRate")]
    pub resting_heart_rate: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    #[serde(default)]
    pub steps: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepSummary {
    #[serde(default)]
    pub deep: Option<DurationInput>,
    #[serde(default)]
    pub light: Option<DurationInput>,
    #[serde(default)]
    pub rem: Option<DurationInput>,
    #[serde(default)]
    pub wake: Option<DurationInput>,
}

const SENTIMENT_TOKENS: [(&str, Emotion); 3] = [
    ("POSITIVE", Emotion::Positive),
    ("NEGATIVE", Emotion::Negative),
    ("NEUTRAL", Emotion::Neutral),
];

/// Classifies a free-form sentiment label. Tokens are tried in table order,
/// so a label holding several resolves to the earliest entry. Labels with no
/// token count as neutral.
pub fn classify_sentiment(label: &str) -> Emotion {
    SENTIMENT_TOKENS
        .iter()
        .find(|(token, _)| label.contains(token))
        .map(|(_, emotion)| *emotion)
        .unwrap_or(Emotion::Neutral)
}

impl ResultsSnapshot {
    /// Emotion of the first sentiment entry, if the snapshot has one.
    pub fn emotion(&self) -> Option<Emotion> {
        let entry = self.audio_results.as_ref()?.sentiment.as_ref()?.first()?;
        let label = match &entry.sentiment {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Some(classify_sentiment(&label))
    }

    pub fn summary(&self) -> Option<&str> {
        self.audio_results.as_ref()?.summary.as_deref()
    }

    pub fn to_partial_record(&self) -> PartialDayRecord {
        let fitbit = self.fitbit_results.clone().unwrap_or_default();
        let sleep = fitbit.sleep.unwrap_or_default();
        PartialDayRecord {
            emotion: self.emotion(),
            steps: fitbit.activity.and_then(|activity| activity.steps),
            deep_sleep: sleep.deep,
            light_sleep: sleep.light,
            rem_sleep: sleep.rem,
            awake: sleep.wake,
            heart_rate: fitbit.heart.and_then(|heart| heart.resting_heart_rate),
        }
    }
}

/// Anything that can hand out the current results snapshot.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    async fn fetch_snapshot(&self) -> Result<ResultsSnapshot, FetchFailure>;
}

/// Client for the recording/analysis backend.
#[derive(Clone)]
pub struct AnalysisBackend {
    client: Client,
    base_url: String,
}

impl AnalysisBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn start_recording(&self) -> Result<(), FetchFailure> {
        self.post_lifecycle("start-recording").await
    }

    /// Returns only once the backend reports processing as complete.
    pub async fn stop_recording(&self) -> Result<(), FetchFailure> {
        self.post_lifecycle("stop-recording").await
    }

    // The backend sometimes reports failure as `{"error": ...}` with a 200.
    async fn post_lifecycle(&self, path: &str) -> Result<(), FetchFailure> {
        let url = self.url(path);
        let body: serde_json::Value = self.send(self.client.post(&url), &url).await?;
        if let Some(message) = embedded_error(&body) {
            return Err(FetchFailure::Rejected { url, message });
        }
        Ok(())
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, FetchFailure> {
        let response = request.send().await.map_err(|source| FetchFailure::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status {
                url: url.to_string(),
                status,
            });
        }

        response.json().await.map_err(|source| FetchFailure::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn embedded_error(body: &serde_json::Value) -> Option<String> {
    let error = match body {
        serde_json::Value::Object(map) => map.get("error"),
        serde_json::Value::Array(items) => items.iter().find_map(|item| item.get("error")),
        _ => None,
    }?;
    Some(match error {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

#[async_trait]
impl SnapshotSource for AnalysisBackend {
    async fn fetch_snapshot(&self) -> Result<ResultsSnapshot, FetchFailure> {
        let url = self.url("results");
        self.send(self.client.get(&url), &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_by_token_table_order() {
        assert_eq!(classify_sentiment("LABEL_POSITIVE (0.98)"), Emotion::Positive);
        assert_eq!(classify_sentiment("SentimentType.NEGATIVE"), Emotion::Negative);
        assert_eq!(classify_sentiment("NEUTRAL"), Emotion::Neutral);
        assert_eq!(classify_sentiment("NEGATIVE then POSITIVE"), Emotion::Positive);
        assert_eq!(classify_sentiment("NEUTRAL or NEGATIVE"), Emotion::Negative);
        assert_eq!(classify_sentiment("positive"), Emotion::Neutral);
        assert_eq!(classify_sentiment("something else"), Emotion::Neutral);
    }

    #[test]
    fn no_results_message_decodes_to_empty_snapshot() {
        let snapshot: ResultsSnapshot =
            serde_json::from_value(json!({ "message": "No results available yet" })).unwrap();
        assert_eq!(snapshot, ResultsSnapshot::default());
        assert_eq!(snapshot.emotion(), None);
        assert_eq!(snapshot.to_partial_record(), PartialDayRecord::default());
    }

    #[test]
    fn snapshot_maps_onto_partial_record() {
        let snapshot: ResultsSnapshot = serde_json::from_value(json!({
            "audio_results": {
                "sentiment": [{ "sentiment": "SentimentType.POSITIVE" }, { "sentiment": "NEGATIVE" }],
                "summary": "- felt rested"
            },
            "fitbit_results": {
                "heart": { "restingHeartRate": 58 },
                "activity": { "steps": 10432, "floors": 3 },
                "sleep": { "deep": 70, "light": 210, "rem": "1h 20m", "wake": 35 }
            },
            "recommendations": "Title: A\nDescription: B"
        }))
        .unwrap();

        let partial = snapshot.to_partial_record();
        assert_eq!(partial.emotion, Some(Emotion::Positive));
        assert_eq!(partial.steps, Some(10432));
        assert_eq!(partial.heart_rate, Some(58));
        assert_eq!(partial.deep_sleep, Some(DurationInput::Minutes(70)));
        assert_eq!(partial.rem_sleep, Some(DurationInput::Text("1h 20m".into())));
        assert_eq!(partial.awake, Some(DurationInput::Minutes(35)));
        assert_eq!(snapshot.summary(), Some("- felt rested"));
    }

    #[test]
    fn detects_errors_embedded_in_ok_bodies() {
        assert_eq!(
            embedded_error(&json!({ "error": "Failed to stop recording: boom" })),
            Some("Failed to stop recording: boom".into())
        );
        assert_eq!(
            embedded_error(&json!([{ "error": "Failed to start recording" }, 500])),
            Some("Failed to start recording".into())
        );
        assert_eq!(embedded_error(&json!({ "message": "Recording started" })), None);
    }
}
