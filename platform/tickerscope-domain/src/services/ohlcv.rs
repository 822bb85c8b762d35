use crate::value_objects::bar::Bar;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Calendar gaps longer than this (a long weekend) count as missing data.
pub const MAX_EXPECTED_GAP_DAYS: i64 = 4;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DataQualityReport {
    pub rows: usize,
    pub duplicates: usize,
    pub out_of_order: usize,
    pub invalid_close: usize,
    /// Rows whose volume was negative or not finite; their volume is set to 0.
    pub invalid_volume: usize,
    pub gaps: usize,
    pub max_gap_days: Option<i64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl DataQualityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates == 0 && self.out_of_order == 0
            && self.invalid_close == 0
            && self.invalid_volume == 0
    }
}

/// Sorts bars by date, keeps the last row seen for a duplicated date and drops
/// rows whose close is not a finite, non-negative number. A bad volume keeps the
/// row but is replaced by 0.
pub fn canonicalize_bars(bars: Vec<Bar>) -> (Vec<Bar>, DataQualityReport) {
    let mut report = DataQualityReport::default();
    let mut by_date: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    let mut last_seen: Option<NaiveDate> = None;

    for mut bar in bars {
        if !bar.close.is_finite() || bar.close < 0.0 {
            report.invalid_close += 1;
            continue;
        }
        if !bar.volume.is_finite() || bar.volume < 0.0 {
            report.invalid_volume += 1;
            bar.volume = 0.0;
        }

        if let Some(prev) = last_seen {
            if bar.date < prev {
                report.out_of_order += 1;
            }
        }
        last_seen = Some(bar.date);

        if by_date.insert(bar.date, bar).is_some() {
            report.duplicates += 1;
        }
    }

    let bars: Vec<Bar> = by_date.into_values().collect();
    report.rows = bars.len();
    report.first_date = bars.first().map(|b| b.date);
    report.last_date = bars.last().map(|b| b.date);

    let mut max_gap: Option<i64> = None;
    for pair in bars.windows(2) {
        let diff = (pair[1].date - pair[0].date).num_days();
        if diff > MAX_EXPECTED_GAP_DAYS {
            report.gaps += 1;
            max_gap = Some(max_gap.map_or(diff, |current| current.max(diff)));
        }
    }
    report.max_gap_days = max_gap;

    (bars, report)
}
