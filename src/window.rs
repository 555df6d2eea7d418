//! Calendar-month windows used to select records for aggregation.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// The half-open interval `[first instant of month, first instant of next month)`.
pub struct MonthWindow {
    year: i32,
    month: u32,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| MonthWindow { year, month })
    }

    /// The last fully elapsed calendar month before `reference`.
    ///
    /// A reference on the first instant of a month still selects the month
    /// before it, never the one that has just started.
    pub fn preceding(reference: NaiveDateTime) -> Self {
        let (year, month) = match reference.month() {
            1 => (reference.year() - 1, 12),
            m => (reference.year(), m - 1),
        };

        MonthWindow { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts.year() == self.year && ts.month() == self.month
    }

    /// Start (inclusive) and end (exclusive) instants, when both are representable.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let (next_year, next_month) = match self.month {
            12 => (self.year + 1, 1),
            m => (self.year, m + 1),
        };
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)?.and_hms_opt(0, 0, 0)?;
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.and_hms_opt(0, 0, 0)?;

        Some((start, end))
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// -- Tests -------------------------------------------------------------------
