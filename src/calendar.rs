use crate::date_key::DateKey;
use crate::errors::CalendarError;
use crate::models::{DayRecord, Emotion};
use crate::store::DayStore;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Years a date key can spell.
const YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        if !YEARS.contains(&year) {
            return Err(CalendarError::YearOutOfRange(year));
        }
        Ok(Self { year, month })
    }

    pub fn containing(key: DateKey) -> Self {
        let date = key.date();
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// `None` past December 9999.
    pub fn next(self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year.checked_add(1)?, 1).ok()
        } else {
            Some(Self {
                month: self.month + 1,
                ..self
            })
        }
    }

    /// `None` before January of year 0.
    pub fn prev(self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year.checked_sub(1)?, 12).ok()
        } else {
            Some(Self {
                month: self.month - 1,
                ..self
            })
        }
    }

    pub fn last_day(self) -> u32 {
        // Every month has a 28th.
        (29..=31)
            .rev()
            .find(|&day| NaiveDate::from_ymd_opt(self.year, self.month, day).is_some())
            .unwrap_or(28)
    }

    pub fn label(self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarCell {
    pub day: u32,
    pub date: DateKey,
    pub emotion: Emotion,
    pub color: &'static str,
    pub selected: bool,
    pub has_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub selected: Option<DateKey>,
    pub days: Vec<CalendarCell>,
}

/// Month navigation and day selection over the record store.
#[derive(Debug, Clone)]
pub struct CalendarController {
    current_month: YearMonth,
    selected_date: Option<DateKey>,
}

impl CalendarController {
    pub fn new(current_month: YearMonth) -> Self {
        Self {
            current_month,
            selected_date: None,
        }
    }

    pub fn starting_at(today: DateKey) -> Self {
        Self::new(YearMonth::containing(today))
    }

    /// A read-only look at another month that keeps the current selection.
    pub fn browse(&self, month: YearMonth) -> Self {
        Self {
            current_month: month,
            selected_date: self.selected_date,
        }
    }

    pub fn selected_date(&self) -> Option<DateKey> {
        self.selected_date
    }

    /// Moves one month. At the edge of the supported years the month stays put.
    pub fn navigate(&mut self, direction: Direction) -> YearMonth {
        let moved = match direction {
            Direction::Prev => self.current_month.prev(),
            Direction::Next => self.current_month.next(),
        };
        if let Some(month) = moved {
            self.current_month = month;
        }
        self.current_month
    }

    /// Selects `day` of the displayed month. A missing record is a normal
    /// answer meaning "no data for that day".
    pub fn select_day(
        &mut self,
        day: u32,
        store: &DayStore,
    ) -> Result<(DateKey, Option<DayRecord>), CalendarError> {
        let YearMonth { year, month } = self.current_month;
        let last = self.current_month.last_day();
        let key = DateKey::from_ymd(year, month, day).ok_or(CalendarError::DayOutOfRange {
            year,
            month,
            day,
            last,
        })?;

        self.selected_date = Some(key);
        Ok((key, store.get(&key).cloned()))
    }

    pub fn month_view(&self, store: &DayStore) -> MonthView {
        let YearMonth { year, month } = self.current_month;
        let days = (1..=self.current_month.last_day())
            .filter_map(|day| DateKey::from_ymd(year, month, day).map(|key| (day, key)))
            .map(|(day, date)| {
                let record = store.get(&date);
                let emotion = record.map(|r| r.emotion).unwrap_or_default();
                CalendarCell {
                    day,
                    date,
                    emotion,
                    color: emotion.color(),
                    selected: self.selected_date == Some(date),
                    has_data: record.is_some(),
                }
            })
            .collect();

        MonthView {
            year,
            month,
            label: self.current_month.label(),
            selected: self.selected_date,
            days,
        }
    }
}
