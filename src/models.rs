use crate::date_key::{DateKey, parse_duration};
use crate::errors::InvalidRecordError;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Positive,
    Neutral,
    Negative,
    /// No label recorded, or one we do not recognise. Distinct from `Neutral`.
    #[default]
    Unset,
}

impl Emotion {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Self::Positive,
            "neutral" => Self::Neutral,
            "negative" => Self::Negative,
            _ => Self::Unset,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Unset => "unset",
        }
    }

    /// Colour token for calendar cells.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Positive => "green",
            Self::Neutral => "yellow",
            Self::Negative => "red",
            Self::Unset => "transparent",
        }
    }
}

impl<'de> Deserialize<'de> for Emotion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Sleep stage durations in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SleepStages {
    pub deep: u32,
    pub light: u32,
    pub rem: u32,
    pub awake: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DayRecord {
    #[serde(skip_serializing_if = "Emotion::is_unset")]
    pub emotion: Emotion,
    pub steps: u64,
    pub deep_sleep: u32,
    pub light_sleep: u32,
    pub rem_sleep: u32,
    pub awake: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
}

impl DayRecord {
    pub fn sleep(&self) -> SleepStages {
        SleepStages {
            deep: self.deep_sleep,
            light: self.light_sleep,
            rem: self.rem_sleep,
            awake: self.awake,
        }
    }
}

/// A sleep duration as it arrives on the wire: whole minutes or `"<H>h <M>m"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Minutes(i64),
    Text(String),
}

impl DurationInput {
    fn to_minutes(&self, field: &'static str) -> Result<u32, InvalidRecordError> {
        match self {
            Self::Minutes(value) => non_negative(field, *value),
            Self::Text(text) => {
                parse_duration(text).map_err(|source| InvalidRecordError::Duration { field, source })
            }
        }
    }
}

impl From<u32> for DurationInput {
    fn from(minutes: u32) -> Self {
        Self::Minutes(i64::from(minutes))
    }
}

/// Field-level update for one day. `None` leaves the stored value alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartialDayRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,
    #[serde(default, alias = "deepSleep", alias = "deep", skip_serializing_if = "Option::is_none")]
    pub deep_sleep: Option<DurationInput>,
    #[serde(default, alias = "lightSleep", alias = "light", skip_serializing_if = "Option::is_none")]
    pub light_sleep: Option<DurationInput>,
    #[serde(default, alias = "remSleep", alias = "rem", skip_serializing_if = "Option::is_none")]
    pub rem_sleep: Option<DurationInput>,
    #[serde(default, alias = "wake", skip_serializing_if = "Option::is_none")]
    pub awake: Option<DurationInput>,
    #[serde(default, alias = "heartRate", skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i64>,
}

/// A partial record after validation, every value already in storage units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RecordPatch {
    pub emotion: Option<Emotion>,
    pub steps: Option<u64>,
    pub deep_sleep: Option<u32>,
    pub light_sleep: Option<u32>,
    pub rem_sleep: Option<u32>,
    pub awake: Option<u32>,
    pub heart_rate: Option<u32>,
}

impl PartialDayRecord {
    pub(crate) fn normalize(&self) -> Result<RecordPatch, InvalidRecordError> {
        let steps = match self.steps {
            Some(value) if value < 0 => {
                return Err(InvalidRecordError::Negative {
                    field: "steps",
                    value,
                });
            }
            Some(value) => Some(value as u64),
            None => None,
        };

        Ok(RecordPatch {
            emotion: self.emotion,
            steps,
            deep_sleep: duration("deep_sleep", &self.deep_sleep)?,
            light_sleep: duration("light_sleep", &self.light_sleep)?,
            rem_sleep: duration("rem_sleep", &self.rem_sleep)?,
            awake: duration("awake", &self.awake)?,
            heart_rate: self
                .heart_rate
                .map(|value| non_negative("heart_rate", value))
                .transpose()?,
        })
    }
}

impl RecordPatch {
    pub(crate) fn apply_to(&self, record: &mut DayRecord) {
        if let Some(emotion) = self.emotion {
            record.emotion = emotion;
        }
        if let Some(steps) = self.steps {
            record.steps = steps;
        }
        if let Some(deep) = self.deep_sleep {
            record.deep_sleep = deep;
        }
        if let Some(light) = self.light_sleep {
            record.light_sleep = light;
        }
        if let Some(rem) = self.rem_sleep {
            record.rem_sleep = rem;
        }
        if let Some(awake) = self.awake {
            record.awake = awake;
        }
        if let Some(heart_rate) = self.heart_rate {
            record.heart_rate = Some(heart_rate);
        }
    }
}

fn duration(
    field: &'static str,
    value: &Option<DurationInput>,
) -> Result<Option<u32>, InvalidRecordError> {
    value.as_ref().map(|input| input.to_minutes(field)).transpose()
}

fn non_negative(field: &'static str, value: i64) -> Result<u32, InvalidRecordError> {
    if value < 0 {
        return Err(InvalidRecordError::Negative { field, value });
    }
    u32::try_from(value).map_err(|_| InvalidRecordError::OutOfRange { field, value })
}

/// Body of the record update endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub date: DateKey,
    #[serde(flatten)]
    pub record: PartialDayRecord,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: DateKey,
    pub record: Option<DayRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
}

/// One chart sample. Days without a record are zero-filled with `has_data`
/// false so the axis keeps its length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: DateKey,
    pub label: String,
    pub has_data: bool,
    pub emotion: Emotion,
    pub steps: u64,
    pub heart_rate: u32,
    pub deep_sleep_minutes: u32,
    pub light_sleep_minutes: u32,
    pub rem_sleep_minutes: u32,
    pub awake_minutes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_is_case_folded_and_unknown_is_unset() {
        assert_eq!(Emotion::parse("POSITIVE"), Emotion::Positive);
        assert_eq!(Emotion::parse(" Negative "), Emotion::Negative);
        assert_eq!(Emotion::parse("neutral"), Emotion::Neutral);
        assert_eq!(Emotion::parse("happy"), Emotion::Unset);
        assert_eq!(Emotion::parse(""), Emotion::Unset);
    }

    #[test]
    fn partial_accepts_minutes_strings_and_aliases() {
        let partial: PartialDayRecord = serde_json::from_value(serde_json::json!({
            "emotion": "Positive",
            "steps": 8200,
            "deepSleep": "1h 30m",
            "light_sleep": 240,
            "wake": "0h 12m",
        }))
        .unwrap();

        let patch = partial.normalize().unwrap();
        assert_eq!(patch.emotion, Some(Emotion::Positive));
        assert_eq!(patch.steps, Some(8200));
        assert_eq!(patch.deep_sleep, Some(90));
        assert_eq!(patch.light_sleep, Some(240));
        assert_eq!(patch.awake, Some(12));
        assert_eq!(patch.rem_sleep, None);
        assert_eq!(patch.heart_rate, None);
    }

    #[test]
    fn negative_and_malformed_fields_are_rejected() {
        let negative_steps = PartialDayRecord {
            steps: Some(-1),
            ..Default::default()
        };
        assert_eq!(
            negative_steps.normalize(),
            Err(InvalidRecordError::Negative {
                field: "steps",
                value: -1
            })
        );

        let negative_sleep = PartialDayRecord {
            rem_sleep: Some(DurationInput::Minutes(-30)),
            ..Default::default()
        };
        assert!(negative_sleep.normalize().is_err());

        let malformed = PartialDayRecord {
            deep_sleep: Some(DurationInput::Text("2h".into())),
            ..Default::default()
        };
        assert!(matches!(
            malformed.normalize(),
            Err(InvalidRecordError::Duration {
                field: "deep_sleep",
                ..
            })
        ));
    }

    #[test]
    fn unset_emotion_is_omitted_when_serialized() {
        let record = DayRecord {
            steps: 10,
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("emotion").is_none());
        assert_eq!(value["steps"], 10);

        let positive = DayRecord {
            emotion: Emotion::Positive,
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&positive).unwrap()["emotion"], "positive");
    }
}
