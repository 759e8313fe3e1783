use crate::date_key::DateKey;
use crate::errors::InvalidRecordError;
use crate::models::{DayRecord, PartialDayRecord};
use std::collections::BTreeMap;

/// In-memory table of day records keyed by local calendar day.
///
/// `merge` is the only way a record changes; nothing is ever removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayStore {
    days: BTreeMap<DateKey, DayRecord>,
}

impl DayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &DateKey) -> Option<&DayRecord> {
        self.days.get(key)
    }

    /// Overwrites the fields present in `partial` and keeps every other field.
    ///
    /// The partial is validated before anything is touched, so a rejected
    /// update leaves the store exactly as it was.
    pub fn merge(
        &mut self,
        key: DateKey,
        partial: &PartialDayRecord,
    ) -> Result<DayRecord, InvalidRecordError> {
        let patch = partial.normalize()?;
        let record = self.days.entry(key).or_default();
        patch.apply_to(record);
        Ok(record.clone())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &DayRecord)> {
        self.days.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DurationInput, Emotion};

    fn key(day: u32) -> DateKey {
        DateKey::from_ymd(2024, 5, day).unwrap()
    }

    #[test]
    fn get_on_empty_store_is_absent() {
        let store = DayStore::new();
        assert!(store.get(&key(1)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn merge_preserves_fields_missing_from_update() {
        let mut store = DayStore::new();
        store
            .merge(
                key(3),
                &PartialDayRecord {
                    emotion: Some(Emotion::Positive),
                    steps: Some(100),
                    ..Default::default()
                },
            )
            .unwrap();

        let merged = store
            .merge(
                key(3),
                &PartialDayRecord {
                    steps: Some(500),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(merged.emotion, Emotion::Positive);
        assert_eq!(merged.steps, 500);
        assert_eq!(store.get(&key(3)), Some(&merged));
    }

    #[test]
    fn merge_is_idempotent() {
        let partial = PartialDayRecord {
            emotion: Some(Emotion::Negative),
            deep_sleep: Some(DurationInput::Text("1h 10m".into())),
            heart_rate: Some(61),
            ..Default::default()
        };

        let mut once = DayStore::new();
        let first = once.merge(key(7), &partial).unwrap();

        let mut twice = once.clone();
        let second = twice.merge(key(7), &partial).unwrap();

        assert_eq!(first, second);
        assert_eq!(once, twice);
        assert_eq!(second.deep_sleep, 70);
    }

    #[test]
    fn fresh_record_starts_unset_and_zeroed() {
        let mut store = DayStore::new();
        let record = store
            .merge(
                key(9),
                &PartialDayRecord {
                    rem_sleep: Some(DurationInput::Minutes(45)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(record.emotion, Emotion::Unset);
        assert_eq!(record.steps, 0);
        assert_eq!(record.rem_sleep, 45);
        assert_eq!(record.heart_rate, None);
    }

    #[test]
    fn rejected_merge_leaves_store_untouched() {
        let mut store = DayStore::new();
        store
            .merge(
                key(2),
                &PartialDayRecord {
                    steps: Some(42),
                    ..Default::default()
                },
            )
            .unwrap();
        let before = store.clone();

        let err = store
            .merge(
                key(2),
                &PartialDayRecord {
                    emotion: Some(Emotion::Positive),
                    light_sleep: Some(DurationInput::Minutes(-5)),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(err, InvalidRecordError::Negative { field: "light_sleep", .. }));
        assert_eq!(store, before);

        assert!(
            store
                .merge(
                    key(4),
                    &PartialDayRecord {
                        steps: Some(-3),
                        ..Default::default()
                    },
                )
                .is_err()
        );
        assert!(store.get(&key(4)).is_none());
    }
}
