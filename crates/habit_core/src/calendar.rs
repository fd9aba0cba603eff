//! Month calendar arithmetic and grid layout.
//!
//! # Responsibility
//! - Resolve month length and the weekday of the 1st for any month.
//! - Lay the days of a month into Sunday-first week rows.
//! - Merge per-date completion counts into a renderable month view.
//!
//! # Invariants
//! - `YearMonth::month` is always within `1..=12`.
//! - Every laid-out row holds between 1 and 7 cells; only the first row may
//!   start with empty cells and the last row is never padded.
//! - The number of day cells equals the month length.

use crate::model::achievement::CalendarEntry;
use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Column headers, Sunday first.
pub const WEEK_LABELS: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

const DAYS_PER_WEEK: usize = 7;
const INTENSITY_BASE: f64 = 0.2;
const INTENSITY_STEP: f64 = 0.15;
const INTENSITY_MAX: f64 = 0.8;

static YEAR_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("valid year-month regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("expected month in YYYY-MM format, got `{0}`")]
    MalformedMonth(String),
    #[error("month must be within 1..=12, got {0}")]
    MonthOutOfRange(u32),
    #[error("day {day} does not exist in {month}")]
    DayOutOfRange { month: YearMonth, day: u32 },
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month containing the local current date.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// One-based month number.
    pub fn month(self) -> u32 {
        self.month
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the month.
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Date of `day` within this month.
    pub fn date(self, day: u32) -> Result<NaiveDate, CalendarError> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
            .ok_or(CalendarError::DayOutOfRange { month: self, day })
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let caps = YEAR_MONTH_RE
            .captures(value.trim())
            .ok_or_else(|| CalendarError::MalformedMonth(value.to_string()))?;
        let year = caps[1]
            .parse::<i32>()
            .map_err(|_| CalendarError::MalformedMonth(value.to_string()))?;
        let month = caps[2]
            .parse::<u32>()
            .map_err(|_| CalendarError::MalformedMonth(value.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Number of days in the month (28..=31).
pub fn days_in_month(ym: YearMonth) -> u32 {
    let next = ym.next().first_day();
    next.signed_duration_since(ym.first_day()).num_days() as u32
}

/// Weekday of the 1st, Sunday = 0.
pub fn first_weekday_offset(ym: YearMonth) -> u32 {
    ym.first_day().weekday().num_days_from_sunday()
}

/// Day numbers `1..=len` of the month.
pub fn month_days(ym: YearMonth) -> Vec<u32> {
    (1..=days_in_month(ym)).collect()
}

/// `YYYY-MM-DD` key for a day of the month.
pub fn date_key(ym: YearMonth, day: u32) -> String {
    format!("{ym}-{day:02}")
}

/// One slot in a week row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    /// Leading filler before the 1st.
    Empty,
    Day(u32),
}

/// Lays the month into week rows, Sunday first.
pub fn layout_weeks(ym: YearMonth) -> Vec<Vec<GridCell>> {
    let days = month_days(ym);
    let last = days.len() as u32;
    let mut rows = Vec::new();
    let mut cells: Vec<GridCell> = (0..first_weekday_offset(ym))
        .map(|_| GridCell::Empty)
        .collect();

    for day in days {
        cells.push(GridCell::Day(day));
        if cells.len() % DAYS_PER_WEEK == 0 || day == last {
            rows.push(std::mem::take(&mut cells));
        }
    }
    if !cells.is_empty() {
        rows.push(cells);
    }
    rows
}

/// Shading strength for a day with `count` completed tasks.
pub fn cell_intensity(count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (INTENSITY_BASE + f64::from(count) * INTENSITY_STEP).min(INTENSITY_MAX)
}

/// Renderable day cell.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub completed_count: u32,
    pub selected: bool,
}

impl DayCell {
    /// Whether the day has a recorded achievement with at least one completion.
    pub fn achieved(&self) -> bool {
        self.completed_count > 0
    }

    pub fn intensity(&self) -> f64 {
        cell_intensity(self.completed_count)
    }
}

/// Month grid merged with completion history.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView {
    pub month: YearMonth,
    pub rows: Vec<Vec<Option<DayCell>>>,
}

impl CalendarView {
    /// Builds the view; entries outside `month` are ignored.
    pub fn build(month: YearMonth, entries: &[CalendarEntry], selected: Option<u32>) -> Self {
        let counts: HashMap<NaiveDate, u32> = entries
            .iter()
            .filter(|entry| YearMonth::of(entry.date) == month)
            .map(|entry| (entry.date, entry.completed_count))
            .collect();

        let rows = layout_weeks(month)
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        GridCell::Empty => None,
                        GridCell::Day(day) => {
                            let date = month.date(day).ok()?;
                            Some(DayCell {
                                day,
                                date,
                                completed_count: counts.get(&date).copied().unwrap_or(0),
                                selected: selected == Some(day),
                            })
                        }
                    })
                    .collect()
            })
            .collect();

        Self { month, rows }
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.rows.iter().flatten().flatten()
    }
}
