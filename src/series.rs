use crate::date_key::DateKey;
use crate::models::{DayRecord, Emotion, TimeSeriesPoint};
use crate::store::DayStore;
use serde::Serialize;

pub const WEEK_WINDOW: usize = 7;
pub const OVERVIEW_WINDOW: usize = 31;

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub reference: DateKey,
    pub window: usize,
    pub points: Vec<TimeSeriesPoint>,
    pub averages: SeriesAverages,
}

/// Means over the days in the window that actually have a record.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct SeriesAverages {
    pub days_counted: usize,
    pub steps: f64,
    pub deep_sleep_minutes: f64,
    pub light_sleep_minutes: f64,
    pub rem_sleep_minutes: f64,
}

/// One point per day ending at `reference`, oldest first. Missing days are
/// zero-filled so the result always has exactly `window` points.
pub fn build_series(reference: DateKey, window: usize, store: &DayStore) -> Vec<TimeSeriesPoint> {
    let Some(days_back) = window.checked_sub(1) else {
        return Vec::new();
    };
    let days_back = u32::try_from(days_back).unwrap_or(u32::MAX);

    DateKey::range_of(reference, days_back)
        .into_iter()
        .map(|key| point(key, store.get(&key)))
        .collect()
}

pub fn build_response(reference: DateKey, window: usize, store: &DayStore) -> SeriesResponse {
    let points = build_series(reference, window, store);
    let averages = averages(&points);
    SeriesResponse {
        reference,
        window,
        points,
        averages,
    }
}

fn point(date: DateKey, record: Option<&DayRecord>) -> TimeSeriesPoint {
    let has_data = record.is_some();
    let record = record.cloned().unwrap_or_default();
    TimeSeriesPoint {
        label: date.weekday_label(),
        date,
        has_data,
        emotion: if has_data { record.emotion } else { Emotion::Unset },
        steps: record.steps,
        heart_rate: record.heart_rate.unwrap_or(0),
        deep_sleep_minutes: record.deep_sleep,
        light_sleep_minutes: record.light_sleep,
        rem_sleep_minutes: record.rem_sleep,
        awake_minutes: record.awake,
    }
}

fn averages(points: &[TimeSeriesPoint]) -> SeriesAverages {
    let recorded: Vec<&TimeSeriesPoint> = points.iter().filter(|p| p.has_data).collect();
    if recorded.is_empty() {
        return SeriesAverages::default();
    }

    let denom = recorded.len() as f64;
    let mean = |value: fn(&TimeSeriesPoint) -> f64| recorded.iter().map(|p| value(p)).sum::<f64>() / denom;

    SeriesAverages {
        days_counted: recorded.len(),
        steps: mean(|p| p.steps as f64),
        deep_sleep_minutes: mean(|p| f64::from(p.deep_sleep_minutes)),
        light_sleep_minutes: mean(|p| f64::from(p.light_sleep_minutes)),
        rem_sleep_minutes: mean(|p| f64::from(p.rem_sleep_minutes)),
    }
}
