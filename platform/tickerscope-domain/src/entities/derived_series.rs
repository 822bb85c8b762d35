use crate::value_objects::bar::Bar;
use crate::value_objects::ma_windows::MaWindows;
use crate::value_objects::ticker::Ticker;
use chrono::NaiveDate;
use serde::Serialize;

/// A bar extended with moving averages and returns. Absent values are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedBar {
    #[serde(flatten)]
    pub bar: Bar,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub daily_return: Option<f64>,
    pub cumulative_return: Option<f64>,
}

impl DerivedBar {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries {
    pub ticker: Ticker,
    pub windows: MaWindows,
    pub bars: Vec<DerivedBar>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&DerivedBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&DerivedBar> {
        self.bars.last()
    }
}
