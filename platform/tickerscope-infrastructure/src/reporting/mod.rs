use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tickerscope_domain::entities::derived_series::DerivedSeries;
use tickerscope_domain::entities::summary::Summary;
use tickerscope_domain::errors::DashboardError;

fn optional_field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Column names for the comparison table; repeated tickers get a `_2`, `_3` suffix.
fn comparison_columns(series: &[&DerivedSeries]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    series
        .iter()
        .map(|s| {
            let name = s.ticker.as_str();
            let count = seen.entry(name).or_insert(0);
            *count += 1;
            if *count == 1 {
                name.to_string()
            } else {
                format!("{name}_{count}")
            }
        })
        .collect()
}

pub fn write_series_csv(path: &Path, series: &DerivedSeries) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create series csv {}: {}", path.display(), err))?;

    let short_label = series.windows.short_label();
    let long_label = series.windows.long_label();
    writer
        .write_record([
            "date",
            "open",
            "high",
            "low",
            "close",
            "volume",
            short_label.as_str(),
            long_label.as_str(),
            "daily_return",
            "cumulative_return",
        ])
        .map_err(|err| format!("failed to write series header: {err}"))?;

    for bar in &series.bars {
        writer
            .write_record([
                bar.date().to_string(),
                bar.bar.open.to_string(),
                bar.bar.high.to_string(),
                bar.bar.low.to_string(),
                bar.bar.close.to_string(),
                bar.bar.volume.to_string(),
                optional_field(bar.ma_short),
                optional_field(bar.ma_long),
                optional_field(bar.daily_return),
                optional_field(bar.cumulative_return),
            ])
            .map_err(|err| format!("failed to write series row: {err}"))?;
    }
    writer
        .flush()
        .map_err(|err| format!("failed to flush series csv {}: {}", path.display(), err))
}

/// Cumulative returns of every series, outer-joined on date.
pub fn write_comparison_csv(path: &Path, series: &[&DerivedSeries]) -> Result<(), String> {
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (col, s) in series.iter().enumerate() {
        for bar in &s.bars {
            let row = rows
                .entry(bar.date())
                .or_insert_with(|| vec![None; series.len()]);
            row[col] = bar.cumulative_return;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create comparison csv {}: {}", path.display(), err))?;
    let mut header = vec!["date".to_string()];
    header.extend(comparison_columns(series));
    writer
        .write_record(&header)
        .map_err(|err| format!("failed to write comparison header: {err}"))?;

    for (date, values) in rows {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(date.to_string());
        record.extend(values.into_iter().map(optional_field));
        writer
            .write_record(&record)
            .map_err(|err| format!("failed to write comparison row: {err}"))?;
    }
    writer
        .flush()
        .map_err(|err| format!("failed to flush comparison csv {}: {}", path.display(), err))
}

pub fn write_summary_json(
    path: &Path,
    summaries: &[Summary],
    issues: &[DashboardError],
    meta: Option<&serde_json::Value>,
) -> Result<(), String> {
    let json = serde_json::json!({
        "meta": meta,
        "summaries": summaries,
        "issues": issues,
    });
    let json = serde_json::to_string_pretty(&json)
        .map_err(|err| format!("failed to serialize summary: {}", err))?;
    fs::write(path, json)
        .map_err(|err| format!("failed to write summary {}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::{write_comparison_csv, write_series_csv, write_summary_json};
    use chrono::{Days, NaiveDate};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tickerscope_domain::entities::derived_series::DerivedSeries;
    use tickerscope_domain::errors::DashboardError;
    use tickerscope_domain::services::metrics::{derive, summarize};
    use tickerscope_domain::value_objects::bar::Bar;
    use tickerscope_domain::value_objects::bar_series::BarSeries;
    use tickerscope_domain::value_objects::ma_windows::MaWindows;
    use tickerscope_domain::value_objects::ticker::Ticker;

    fn unique_tmp_path(name: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("tickerscope_{name}_{}_{}", std::process::id(), now))
    }

    fn series(ticker: &str, first_day: u32, closes: &[f64]) -> DerivedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, first_day).expect("date");
        let bars = closes
            .iter()
            .copied()
            .enumerate()
            .map(|(idx, close)| Bar {
                date: start + Days::new(idx as u64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect();
        let series = BarSeries::new(Ticker::parse(ticker).expect("ticker"), bars).expect("series");
        derive(&series, MaWindows::new(2, 3).expect("windows"))
    }

    #[test]
    fn series_csv_writes_empty_fields_for_absent_values() {
        let path = unique_tmp_path("series.csv");
        write_series_csv(&path, &series("AAPL", 2, &[100.0, 110.0, 121.0])).expect("write");

        let contents = fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "date,open,high,low,close,volume,ma_2,ma_3,daily_return,cumulative_return"
        );
        assert_eq!(lines[1], "2024-01-02,100,100,100,100,1000,,,,");
        assert!(lines[2].starts_with("2024-01-03,110,110,110,110,1000,105,,"));
        assert!(lines[3].starts_with("2024-01-04,121,121,121,121,1000,115.5,110.333"));
        assert_eq!(lines.len(), 4);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn comparison_csv_outer_joins_on_date() {
        let path = unique_tmp_path("comparison.csv");
        let a = series("AAPL", 2, &[100.0, 110.0]);
        let b = series("MSFT", 3, &[50.0, 60.0]);
        let c = series("AAPL", 2, &[10.0]);
        write_comparison_csv(&path, &[&a, &b, &c]).expect("write");

        let contents = fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "date,AAPL,MSFT,AAPL_2");
        assert_eq!(lines[1], "2024-01-02,,,");
        assert!(lines[2].starts_with("2024-01-03,0.1"));
        assert!(lines[2].ends_with(",,"));
        assert!(lines[3].starts_with("2024-01-04,,0.19"));
        assert_eq!(lines.len(), 4);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn summary_json_includes_issues_and_meta() {
        let path = unique_tmp_path("summary.json");
        let derived = series("AAPL", 2, &[100.0, 110.0, 121.0]);
        let summary = summarize(&derived).expect("summary");
        let issues = vec![DashboardError::NoDataForTicker {
            ticker: "ZZZZ".to_string(),
        }];
        let meta = serde_json::json!({ "run_id": "20240104_abc" });
        write_summary_json(&path, &[summary], &issues, Some(&meta)).expect("write");

        let contents = fs::read_to_string(&path).expect("read");
        let json: serde_json::Value = serde_json::from_str(&contents).expect("json");
        assert_eq!(json["meta"]["run_id"], "20240104_abc");
        assert_eq!(json["summaries"][0]["ticker"], "AAPL");
        assert_eq!(json["summaries"][0]["bars"], 3);
        assert_eq!(json["issues"][0]["kind"], "no_data_for_ticker");
        assert_eq!(json["issues"][0]["ticker"], "ZZZZ");

        let _ = fs::remove_file(path);
    }
}
