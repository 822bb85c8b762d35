use chrono::{Days, NaiveDate};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tickerscope_application::cache::FetchCache;
use tickerscope_application::config::RequestConfig;
use tickerscope_application::dashboard::run_dashboard;
use tickerscope_application::reporting::{comparison_table, export_report, metrics_panel};
use tickerscope_application::request::{resolve_request, DashboardRequest};
use tickerscope_application::validation::validate;
use tickerscope_domain::entities::derived_series::DerivedSeries;
use tickerscope_domain::entities::summary::Summary;
use tickerscope_domain::errors::{DashboardError, FetchError};
use tickerscope_domain::repositories::artifacts::ArtifactWriter;
use tickerscope_domain::repositories::market_data::{BarQuery, MarketDataRepository};
use tickerscope_domain::services::ohlcv::DataQualityReport;
use tickerscope_domain::value_objects::bar::Bar;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).expect("date")
}

fn bars(closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
    closes
        .iter()
        .copied()
        .enumerate()
        .map(|(idx, close)| Bar {
            date: start + Days::new(idx as u64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        })
        .collect()
}

enum Canned {
    Bars(Vec<Bar>),
    Fail(FetchError),
}

#[derive(Default)]
struct FakeMarketDataRepo {
    by_ticker: HashMap<String, Canned>,
    calls: Cell<usize>,
    fail_once: RefCell<Vec<String>>,
}

impl FakeMarketDataRepo {
    fn with(mut self, ticker: &str, closes: &[f64]) -> Self {
        self.by_ticker
            .insert(ticker.to_string(), Canned::Bars(bars(closes)));
        self
    }

    fn with_raw(mut self, ticker: &str, raw: Vec<Bar>) -> Self {
        self.by_ticker.insert(ticker.to_string(), Canned::Bars(raw));
        self
    }

    fn failing(mut self, ticker: &str) -> Self {
        self.by_ticker.insert(
            ticker.to_string(),
            Canned::Fail(FetchError::Request("connection reset".to_string())),
        );
        self
    }
}

impl MarketDataRepository for FakeMarketDataRepo {
    fn fetch_bars(&self, query: &BarQuery) -> Result<(Vec<Bar>, DataQualityReport), FetchError> {
        self.calls.set(self.calls.get() + 1);
        let name = query.ticker.as_str();
        {
            let mut fail_once = self.fail_once.borrow_mut();
            if let Some(pos) = fail_once.iter().position(|t| t == name) {
                fail_once.remove(pos);
                return Err(FetchError::Request("timed out".to_string()));
            }
        }
        match self.by_ticker.get(name) {
            Some(Canned::Bars(bars)) => Ok((bars.clone(), DataQualityReport::default())),
            Some(Canned::Fail(err)) => Err(err.clone()),
            None => Ok((Vec::new(), DataQualityReport::default())),
        }
    }
}

#[derive(Default)]
struct RecordingWriter {
    ensured_dirs: RefCell<Vec<PathBuf>>,
    series_written: RefCell<Vec<(PathBuf, usize)>>,
    comparison_written: RefCell<Option<usize>>,
    summary_written: RefCell<Option<serde_json::Value>>,
    config_snapshot: RefCell<Option<String>>,
}

impl ArtifactWriter for RecordingWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String> {
        self.ensured_dirs.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn write_series_csv(&self, path: &Path, series: &DerivedSeries) -> Result<(), String> {
        self.series_written
            .borrow_mut()
            .push((path.to_path_buf(), series.len()));
        Ok(())
    }

    fn write_comparison_csv(&self, _path: &Path, series: &[&DerivedSeries]) -> Result<(), String> {
        *self.comparison_written.borrow_mut() = Some(series.len());
        Ok(())
    }

    fn write_summary_json(
        &self,
        _path: &Path,
        summaries: &[Summary],
        issues: &[DashboardError],
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String> {
        let json = serde_json::json!({
            "summaries": summaries,
            "issues": issues,
            "meta": meta,
        });
        *self.summary_written.borrow_mut() = Some(json);
        Ok(())
    }

    fn write_config_snapshot_toml(&self, _path: &Path, contents: &str) -> Result<(), String> {
        *self.config_snapshot.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

fn request(tickers: &str) -> DashboardRequest {
    request_with(tickers, 5, 20)
}

fn request_with(tickers: &str, ma_short: u32, ma_long: u32) -> DashboardRequest {
    let config = RequestConfig {
        tickers: tickers.to_string(),
        days: Some(90),
        ma_short,
        ma_long,
        ..RequestConfig::default()
    };
    resolve_request(&config, today()).expect("request")
}

#[test]
fn unknown_ticker_is_reported_missing_and_others_proceed() {
    let repo = FakeMarketDataRepo::default().with("AAPL", &[100.0, 110.0, 121.0]);
    let mut cache = FetchCache::disabled();

    let report = run_dashboard(&request("AAPL, ZZZZINVALID"), &repo, &mut cache);

    assert_eq!(report.tickers.len(), 1);
    assert_eq!(report.tickers[0].summary.ticker.as_str(), "AAPL");
    assert!(report.outcome().is_ok());
    assert!(report.issues.contains(&DashboardError::NoDataForTicker {
        ticker: "ZZZZINVALID".to_string()
    }));
    assert_eq!(report.missing_tickers(), vec!["ZZZZINVALID"]);

    let total = report.tickers[0].summary.total_return.expect("total return");
    assert!((total - 0.21).abs() < 1e-9);
}

#[test]
fn fetch_failure_does_not_stop_remaining_tickers() {
    let repo = FakeMarketDataRepo::default()
        .failing("MSFT")
        .with("GOOGL", &[10.0, 11.0]);
    let mut cache = FetchCache::disabled();

    let report = run_dashboard(&request("msft, googl"), &repo, &mut cache);

    assert_eq!(repo.calls.get(), 2);
    assert_eq!(report.tickers.len(), 1);
    assert!(matches!(
        &report.issues[0],
        DashboardError::FetchFailure { ticker, message }
            if ticker == "MSFT" && message.contains("connection reset")
    ));
}

#[test]
fn every_ticker_failing_yields_empty_result_set() {
    let repo = FakeMarketDataRepo::default().failing("MSFT");
    let mut cache = FetchCache::disabled();

    let report = run_dashboard(&request("MSFT, NOPE"), &repo, &mut cache);

    assert!(report.is_empty_result_set());
    assert_eq!(report.outcome(), Err(DashboardError::EmptyResultSet));
    assert_eq!(report.issues.last(), Some(&DashboardError::EmptyResultSet));
    assert_eq!(report.missing_tickers(), vec!["MSFT", "NOPE"]);
}

#[test]
fn duplicate_tickers_are_fetched_and_reported_twice() {
    let repo = FakeMarketDataRepo::default().with("AAPL", &[1.0, 2.0]);
    let mut cache = FetchCache::disabled();

    let report = run_dashboard(&request("AAPL, aapl"), &repo, &mut cache);

    assert_eq!(repo.calls.get(), 2);
    assert_eq!(report.tickers.len(), 2);
}

#[test]
fn zero_start_price_is_undefined_not_nan() {
    let repo = FakeMarketDataRepo::default().with("PENNY", &[0.0, 1.0, 2.0, 3.0]);
    let mut cache = FetchCache::disabled();

    let report = run_dashboard(&request("PENNY"), &repo, &mut cache);

    assert_eq!(report.tickers.len(), 1);
    assert!(report.issues.contains(&DashboardError::DivisionUndefined {
        ticker: "PENNY".to_string(),
        quantity: "total_return",
    }));
    assert!(report.missing_tickers().is_empty());

    let rows = comparison_table(&report);
    assert_eq!(rows[0].total_return, "N/A");
    assert_eq!(rows[0].current_price, "$3.00");
    assert_ne!(rows[0].volatility, "N/A");
}

#[test]
fn single_bar_ticker_has_no_volatility() {
    let repo = FakeMarketDataRepo::default().with("IPO", &[25.0]);
    let mut cache = FetchCache::disabled();

    let report = run_dashboard(&request("IPO"), &repo, &mut cache);

    let panel = metrics_panel(&report.tickers[0].summary);
    assert_eq!(panel.total_return, "0.00%");
    assert_eq!(panel.volatility, "N/A");
    assert_eq!(panel.start_price, "$25.00");
}

#[test]
fn unordered_provider_output_is_a_fetch_failure() {
    let mut raw = bars(&[1.0, 2.0]);
    raw.reverse();
    let repo = FakeMarketDataRepo::default().with_raw("BAD", raw);
    let mut cache = FetchCache::disabled();

    let report = run_dashboard(&request("BAD"), &repo, &mut cache);

    assert!(report.is_empty_result_set());
    assert!(matches!(
        &report.issues[0],
        DashboardError::FetchFailure { ticker, .. } if ticker == "BAD"
    ));
}

#[test]
fn identical_request_is_served_from_cache() {
    let repo = FakeMarketDataRepo::default().with("AAPL", &[1.0, 2.0, 3.0]);
    let mut cache = FetchCache::new(None);

    let first = run_dashboard(&request("AAPL"), &repo, &mut cache);
    assert!(!first.from_cache);
    assert_eq!(repo.calls.get(), 1);

    let second = run_dashboard(&request_with("AAPL", 10, 40), &repo, &mut cache);
    assert!(second.from_cache);
    assert_eq!(repo.calls.get(), 1);
    assert_eq!(second.tickers[0].series.windows.short(), 10);

    let third = run_dashboard(&request("AAPL, MSFT"), &repo, &mut cache);
    assert!(!third.from_cache);
    assert_eq!(repo.calls.get(), 3);
}

#[test]
fn transient_failures_are_refetched_next_pass() {
    let repo = FakeMarketDataRepo::default().with("AAPL", &[1.0, 2.0]);
    repo.fail_once.borrow_mut().push("AAPL".to_string());
    let mut cache = FetchCache::new(None);

    let first = run_dashboard(&request("AAPL"), &repo, &mut cache);
    assert!(first.is_empty_result_set());

    let second = run_dashboard(&request("AAPL"), &repo, &mut cache);
    assert!(!second.from_cache);
    assert_eq!(second.tickers.len(), 1);
    assert_eq!(repo.calls.get(), 2);
}

#[test]
fn export_writes_series_comparison_summary_and_snapshot() {
    let repo = FakeMarketDataRepo::default()
        .with("AAPL", &[100.0, 110.0, 121.0])
        .with("MSFT", &[50.0, 55.0, 60.5]);
    let mut cache = FetchCache::disabled();
    let report = run_dashboard(&request("AAPL, MSFT, AAPL, NOPE"), &repo, &mut cache);

    let writer = RecordingWriter::default();
    let result = export_report(
        &report,
        Path::new("runs"),
        Some("[request]\ntickers = \"AAPL\"\n"),
        &writer,
    )
    .expect("export");

    assert_eq!(result.run_dir, Path::new("runs").join(report.request.run_id()));
    assert_eq!(writer.ensured_dirs.borrow().len(), 1);

    let series = writer.series_written.borrow();
    let names: Vec<String> = series
        .iter()
        .map(|(path, _)| path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["AAPL_data.csv", "MSFT_data.csv", "AAPL_2_data.csv"]);
    assert_eq!(series[0].1, 3);
    assert_eq!(*writer.comparison_written.borrow(), Some(3));

    let summary = writer.summary_written.borrow().clone().expect("summary json");
    assert_eq!(summary["summaries"].as_array().map(|a| a.len()), Some(3));
    assert_eq!(summary["issues"][0]["kind"], "no_data_for_ticker");
    assert_eq!(summary["meta"]["ma_short"], 5);
    assert_eq!(summary["meta"]["missing_tickers"][0], "NOPE");
    assert!(writer.config_snapshot.borrow().is_some());
    assert_eq!(result.files.len(), 6);
}

#[test]
fn export_of_empty_result_set_still_writes_summary() {
    let repo = FakeMarketDataRepo::default();
    let mut cache = FetchCache::disabled();
    let report = run_dashboard(&request("NOPE"), &repo, &mut cache);

    let writer = RecordingWriter::default();
    let result = export_report(&report, Path::new("runs"), None, &writer).expect("export");

    assert!(writer.series_written.borrow().is_empty());
    assert!(writer.comparison_written.borrow().is_none());
    let summary = writer.summary_written.borrow().clone().expect("summary json");
    assert_eq!(summary["issues"][1]["kind"], "empty_result_set");
    assert_eq!(result.files.len(), 1);
}

#[test]
fn validate_reports_status_per_ticker() {
    let repo = FakeMarketDataRepo::default()
        .with("AAPL", &[1.0, 2.0])
        .failing("MSFT");

    let json = validate(&request("AAPL, MSFT, NOPE"), &repo);

    assert_eq!(json["requested"], 3);
    assert_eq!(json["ready"], 1);
    assert_eq!(json["tickers"][0]["status"], "ok");
    assert_eq!(json["tickers"][0]["rows"], 2);
    assert_eq!(json["tickers"][1]["status"], "fetch_failure");
    assert_eq!(json["tickers"][2]["status"], "no_data");
}
