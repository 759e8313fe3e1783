use crate::errors::{InvalidDateKeyError, MalformedDurationError};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

const KEY_FORMAT: &str = "%Y-%m-%d";

/// A local calendar day, rendered as `YYYY-MM-DD`.
///
/// The key is the only join between biometric rows, emotion labels and
/// suggestions, so it is built from the date in the timestamp's own zone and
/// never shifted to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.date_naive())
    }

    pub fn today() -> Self {
        Self::of(&Local::now())
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Short weekday name used on chart axes.
    pub fn weekday_label(&self) -> String {
        self.0.format("%a").to_string()
    }

    /// Keys from `days_back` days before `end` up to and including `end`,
    /// oldest first. Empty when the first day would fall before the earliest
    /// representable date.
    pub fn range_of(end: DateKey, days_back: u32) -> Vec<DateKey> {
        let Some(start) = end.0.checked_sub_days(Days::new(u64::from(days_back))) else {
            return Vec::new();
        };
        start
            .iter_days()
            .take(days_back as usize + 1)
            .map(Self)
            .collect()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DateKey {
    type Err = InvalidDateKeyError;

    /// Only the exact `YYYY-MM-DD` shape: four-digit year, no sign, padded
    /// month and day.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidDateKeyError {
            input: s.to_string(),
        };
        let raw = s.trim();
        let shaped = raw.len() == 10
            && raw.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shaped {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(raw, KEY_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a wearable-style duration such as `"2h 15m"` into minutes.
pub fn parse_duration(input: &str) -> Result<u32, MalformedDurationError> {
    let malformed = || MalformedDurationError {
        input: input.to_string(),
    };

    let mut parts = input.split_whitespace();
    let (Some(hours), Some(minutes), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let hours = component(hours, 'h').ok_or_else(malformed)?;
    let minutes = component(minutes, 'm').ok_or_else(malformed)?;

    hours
        .checked_mul(60)
        .and_then(|total| total.checked_add(minutes))
        .ok_or_else(malformed)
}

// Digits only, so a leading '-' or '+' is rejected along with anything else.
fn component(part: &str, unit: char) -> Option<u32> {
    let digits = part.strip_suffix(unit)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn same_local_day_yields_same_key() {
        let zone = FixedOffset::west_opt(5 * 3600).unwrap();
        let early = zone.with_ymd_and_hms(2024, 3, 9, 0, 0, 1).unwrap();
        let late = zone.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();

        assert_eq!(DateKey::of(&early), DateKey::of(&late));
        assert_eq!(DateKey::of(&late).to_string(), "2024-03-09");
    }

    #[test]
    fn key_uses_local_day_not_utc() {
        // 23:30 at UTC-05:00 is already the next day in UTC.
        let zone = FixedOffset::west_opt(5 * 3600).unwrap();
        let evening = zone.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();

        assert_eq!(DateKey::of(&evening).to_string(), "2024-12-31");
    }

    #[test]
    fn key_is_zero_padded_and_round_trips() {
        let key = DateKey::from_ymd(2024, 1, 2).unwrap();
        assert_eq!(key.to_string(), "2024-01-02");
        assert_eq!("2024-01-02".parse::<DateKey>().unwrap(), key);
        assert!("2024-13-02".parse::<DateKey>().is_err());
    }

    #[test]
    fn rejects_keys_outside_strict_shape() {
        for input in ["2024-1-2", "-262143-01-05", "+2024-01-02", "12024-01-02", "2024/01/02", "2024-02-30", ""] {
            assert!(input.parse::<DateKey>().is_err(), "{input:?} should not parse");
        }
    }

    #[test]
    fn range_near_earliest_date_is_empty_instead_of_panicking() {
        let first = DateKey(NaiveDate::MIN);
        assert!(DateKey::range_of(first, 6).is_empty());
        assert_eq!(DateKey::range_of(first, 0), vec![first]);
        assert_eq!(DateKey(NaiveDate::MAX).succ(), None);
    }

    #[test]
    fn range_crosses_year_boundary() {
        let end = DateKey::from_ymd(2024, 1, 2).unwrap();
        let keys: Vec<String> = DateKey::range_of(end, 6)
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            keys,
            vec![
                "2023-12-27",
                "2023-12-28",
                "2023-12-29",
                "2023-12-30",
                "2023-12-31",
                "2024-01-01",
                "2024-01-02",
            ]
        );
    }

    #[test]
    fn range_steps_one_day_through_leap_february() {
        let end = DateKey::from_ymd(2024, 3, 2).unwrap();
        let keys = DateKey::range_of(end, 30);

        assert_eq!(keys.len(), 31);
        assert_eq!(keys.last(), Some(&end));
        for pair in keys.windows(2) {
            assert_eq!(pair[0].succ(), Some(pair[1]));
        }
        assert!(keys.contains(&DateKey::from_ymd(2024, 2, 29).unwrap()));
    }

    #[test]
    fn range_with_zero_days_back_is_just_end() {
        let end = DateKey::from_ymd(2025, 6, 1).unwrap();
        assert_eq!(DateKey::range_of(end, 0), vec![end]);
    }

    #[test]
    fn parses_hour_minute_durations() {
        assert_eq!(parse_duration("2h 15m"), Ok(135));
        assert_eq!(parse_duration("0h 0m"), Ok(0));
        assert_eq!(parse_duration("  1h   5m "), Ok(65));
    }

    #[test]
    fn rejects_incomplete_or_signed_durations() {
        for input in ["2h", "15m", "", "2h 15", "h 15m", "-1h 5m", "1h -5m", "2h 15m 3s", "2x 15m"] {
            assert_eq!(
                parse_duration(input),
                Err(MalformedDurationError {
                    input: input.to_string()
                }),
                "{input:?} should be rejected"
            );
        }
    }
}
