use crate::dashboard::DashboardReport;
use crate::meta::{engine_name, engine_version};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tickerscope_domain::entities::derived_series::DerivedSeries;
use tickerscope_domain::entities::summary::Summary;
use tickerscope_domain::repositories::artifacts::ArtifactWriter;
use tickerscope_domain::services::format::{format_money, format_percent};
use tracing::info_span;

/// Headline numbers for one ticker, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsPanel {
    pub ticker: String,
    pub current_price: String,
    pub start_price: String,
    pub total_return: String,
    pub volatility: String,
}

/// One line of the cross-ticker performance summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub ticker: String,
    pub current_price: String,
    pub total_return: String,
    pub volatility: String,
}

pub const COMPARISON_HEADERS: [&str; 4] = ["Ticker", "Current Price", "Total Return", "Volatility"];

pub fn metrics_panel(summary: &Summary) -> MetricsPanel {
    MetricsPanel {
        ticker: summary.ticker.to_string(),
        current_price: format_money(Some(summary.current_price)),
        start_price: format_money(Some(summary.start_price)),
        total_return: format_percent(summary.total_return),
        volatility: format_percent(summary.volatility),
    }
}

pub fn comparison_table(report: &DashboardReport) -> Vec<ComparisonRow> {
    report
        .tickers
        .iter()
        .map(|t| ComparisonRow {
            ticker: t.summary.ticker.to_string(),
            current_price: format_money(Some(t.summary.current_price)),
            total_return: format_percent(t.summary.total_return),
            volatility: format_percent(t.summary.volatility),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ExportResult {
    pub run_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Writes per-ticker CSVs, the cumulative-return comparison, summary.json and
/// an optional config snapshot into `out_dir/<run_id>/`.
pub fn export_report(
    report: &DashboardReport,
    out_dir: &Path,
    config_toml: Option<&str>,
    writer: &dyn ArtifactWriter,
) -> Result<ExportResult, String> {
    let run_id = report.request.run_id();
    let _span = info_span!("export_report", run_id = %run_id).entered();
    let stage_start = Instant::now();

    let run_dir = out_dir.join(&run_id);
    writer.ensure_dir(&run_dir)?;
    let mut files = Vec::new();

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for ticker in &report.tickers {
        let name = ticker.series.ticker.as_str();
        let count = seen.entry(name).or_insert(0);
        *count += 1;
        let file_name = if *count == 1 {
            format!("{name}_data.csv")
        } else {
            format!("{name}_{count}_data.csv")
        };
        let path = run_dir.join(file_name);
        writer.write_series_csv(&path, &ticker.series)?;
        files.push(path);
    }

    if !report.tickers.is_empty() {
        let series: Vec<&DerivedSeries> = report.tickers.iter().map(|t| &t.series).collect();
        let path = run_dir.join("comparison.csv");
        writer.write_comparison_csv(&path, &series)?;
        files.push(path);
    }

    let meta = summary_meta_json(report, &run_id);
    let summary_path = run_dir.join("summary.json");
    writer.write_summary_json(
        &summary_path,
        &report.summaries(),
        &report.issues,
        Some(&meta),
    )?;
    files.push(summary_path);

    if let Some(contents) = config_toml {
        let path = run_dir.join("config_snapshot.toml");
        writer.write_config_snapshot_toml(&path, contents)?;
        files.push(path);
    }

    metrics::histogram!("tickerscope.export.ms").record(stage_start.elapsed().as_millis() as f64);
    metrics::counter!("tickerscope.export.files").increment(files.len() as u64);

    Ok(ExportResult { run_dir, files })
}

fn summary_meta_json(report: &DashboardReport, run_id: &str) -> serde_json::Value {
    let request = &report.request;
    serde_json::json!({
        "run_id": run_id,
        "engine": engine_name(),
        "version": engine_version(),
        "tickers": request.tickers.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        "start": request.range.start().to_string(),
        "end": request.range.end().to_string(),
        "ma_short": request.windows.short(),
        "ma_long": request.windows.long(),
        "from_cache": report.from_cache,
        "missing_tickers": report.missing_tickers(),
    })
}
