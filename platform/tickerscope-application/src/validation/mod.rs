use crate::request::DashboardRequest;
use std::time::Instant;
use tickerscope_domain::repositories::market_data::{BarQuery, MarketDataRepository};
use tracing::{info_span, warn};

/// Fetches every requested ticker without deriving anything and reports row
/// counts and data quality per ticker.
pub fn validate(
    request: &DashboardRequest,
    market_data: &dyn MarketDataRepository,
) -> serde_json::Value {
    let _span = info_span!("validate", tickers = request.tickers.len()).entered();
    let stage_start = Instant::now();

    let mut ready = 0usize;
    let tickers: Vec<serde_json::Value> = request
        .tickers
        .iter()
        .map(|ticker| {
            let query = BarQuery {
                ticker: ticker.clone(),
                range: request.range,
            };
            match market_data.fetch_bars(&query) {
                Ok((bars, _)) if bars.is_empty() => {
                    warn!(ticker = %ticker, "no data returned");
                    serde_json::json!({ "ticker": ticker.as_str(), "status": "no_data", "rows": 0 })
                }
                Ok((bars, quality)) => {
                    ready += 1;
                    serde_json::json!({
                        "ticker": ticker.as_str(),
                        "status": "ok",
                        "rows": bars.len(),
                        "data_quality": quality,
                    })
                }
                Err(err) => {
                    warn!(ticker = %ticker, error = %err, "fetch failed");
                    serde_json::json!({
                        "ticker": ticker.as_str(),
                        "status": "fetch_failure",
                        "error": err.to_string(),
                    })
                }
            }
        })
        .collect();

    metrics::histogram!("tickerscope.validate.ms").record(stage_start.elapsed().as_millis() as f64);

    serde_json::json!({
        "start": request.range.start().to_string(),
        "end": request.range.end().to_string(),
        "ma_short": request.windows.short(),
        "ma_long": request.windows.long(),
        "ready": ready,
        "requested": request.tickers.len(),
        "tickers": tickers,
    })
}
