//! Moving averages, daily/cumulative returns and per-ticker summary statistics.

pub mod rolling;

use crate::entities::derived_series::{DerivedBar, DerivedSeries};
use crate::entities::summary::Summary;
use crate::value_objects::bar_series::BarSeries;
use crate::value_objects::ma_windows::MaWindows;
use rolling::{CumulativeReturn, RollingSma};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Extends every bar with moving averages and returns. Output length and order
/// match the input; an empty series yields an empty result.
pub fn derive(series: &BarSeries, windows: MaWindows) -> DerivedSeries {
    let mut ma_short = RollingSma::new(windows.short());
    let mut ma_long = RollingSma::new(windows.long());
    let mut cumulative = CumulativeReturn::default();
    let mut prev_close: Option<f64> = None;

    let bars = series
        .bars()
        .iter()
        .map(|bar| {
            let daily_return = prev_close.and_then(|prev| simple_return(prev, bar.close));
            prev_close = Some(bar.close);
            DerivedBar {
                bar: bar.clone(),
                ma_short: ma_short.update(bar.close),
                ma_long: ma_long.update(bar.close),
                daily_return,
                cumulative_return: cumulative.update(daily_return),
            }
        })
        .collect();

    DerivedSeries {
        ticker: series.ticker().clone(),
        windows,
        bars,
    }
}

/// `None` for an empty series.
pub fn summarize(series: &DerivedSeries) -> Option<Summary> {
    let first = series.first()?;
    let last = series.last()?;

    let start_price = first.close();
    let current_price = last.close();
    let total_return = if start_price == 0.0 {
        None
    } else {
        Some(current_price / start_price - 1.0).filter(|value| value.is_finite())
    };

    let returns: Vec<f64> = series.bars.iter().filter_map(|b| b.daily_return).collect();
    let volatility = sample_std_dev(&returns).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt());

    Some(Summary {
        ticker: series.ticker.clone(),
        current_price,
        start_price,
        total_return,
        volatility,
        bars: series.len(),
        first_date: first.date(),
        last_date: last.date(),
    })
}

/// Sample standard deviation (denominator `n - 1`).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.max(0.0).sqrt()).filter(|sd| sd.is_finite())
}

fn simple_return(prev: f64, close: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    Some(close / prev - 1.0).filter(|ret| ret.is_finite())
}
