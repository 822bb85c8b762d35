use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start > end {
            return Err(format!("start date {start} is after end date {end}"));
        }
        Ok(Self { start, end })
    }

    /// `days` calendar days back from `end`, both ends included.
    pub fn trailing_days(end: NaiveDate, days: u32) -> Result<Self, String> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| format!("cannot go back {days} days from {end}"))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
