use std::fmt::Write as _;
use tickerscope_application::dashboard::DashboardReport;
use tickerscope_application::meta::{engine_name, engine_version};
use tickerscope_application::reporting::{comparison_table, metrics_panel, COMPARISON_HEADERS};
use tickerscope_domain::errors::DashboardError;

/// Left-aligned text table with a dashed rule under the header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header_cells, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

pub fn render_report(report: &DashboardReport) -> String {
    let request = &report.request;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} | {} .. {} | MA {}/{}{}",
        engine_name(),
        engine_version(),
        request.range.start(),
        request.range.end(),
        request.windows.short(),
        request.windows.long(),
        if report.from_cache { " | cached" } else { "" }
    );
    let _ = writeln!(out);

    if report.is_empty_result_set() {
        let _ = writeln!(out, "{}", DashboardError::EmptyResultSet);
        render_issues(&mut out, report);
        return out;
    }

    for ticker in &report.tickers {
        let panel = metrics_panel(&ticker.summary);
        let _ = writeln!(out, "== {} ==", panel.ticker);
        let _ = writeln!(out, "  Current Price  {}", panel.current_price);
        let _ = writeln!(out, "  Start Price    {}", panel.start_price);
        let _ = writeln!(out, "  Total Return   {}", panel.total_return);
        let _ = writeln!(out, "  Volatility     {}", panel.volatility);
        let _ = writeln!(
            out,
            "  Bars           {} ({} .. {})",
            ticker.summary.bars, ticker.summary.first_date, ticker.summary.last_date
        );
        let _ = writeln!(out);
    }

    let rows: Vec<Vec<String>> = comparison_table(report)
        .into_iter()
        .map(|row| vec![row.ticker, row.current_price, row.total_return, row.volatility])
        .collect();
    let _ = writeln!(out, "Performance Summary");
    out.push_str(&render_table(&COMPARISON_HEADERS, &rows));

    render_issues(&mut out, report);
    out
}

fn render_issues(out: &mut String, report: &DashboardReport) {
    let issues: Vec<&DashboardError> = report
        .issues
        .iter()
        .filter(|issue| !matches!(issue, DashboardError::EmptyResultSet))
        .collect();
    if issues.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Issues");
    for issue in issues {
        let _ = writeln!(out, "  - {issue}");
    }
}

/// Machine-readable form of a pass, printed by `fetch --json`.
pub fn report_json(report: &DashboardReport) -> serde_json::Value {
    serde_json::json!({
        "run_id": report.request.run_id(),
        "start": report.request.range.start().to_string(),
        "end": report.request.range.end().to_string(),
        "ma_short": report.request.windows.short(),
        "ma_long": report.request.windows.long(),
        "from_cache": report.from_cache,
        "summaries": report.summaries(),
        "issues": report.issues,
        "missing_tickers": report.missing_tickers(),
    })
}
