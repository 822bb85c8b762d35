use chrono::{DateTime, NaiveDate};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tickerscope_domain::errors::FetchError;
use tickerscope_domain::repositories::market_data::{BarQuery, MarketDataRepository};
use tickerscope_domain::services::ohlcv::{canonicalize_bars, DataQualityReport};
use tickerscope_domain::value_objects::bar::Bar;
use tickerscope_domain::value_objects::date_range::DateRange;

/// Error code Yahoo puts in `chart.error` for an unknown symbol.
const NOT_FOUND_CODE: &str = "Not Found";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartData>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YahooCallInfo {
    pub attempts: u32,
    pub duration_ms: u64,
    pub status: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct YahooCallResult {
    pub info: YahooCallInfo,
    pub outcome: Result<(Vec<Bar>, DataQualityReport), FetchError>,
}

/// Daily bars from the Yahoo chart endpoint.
pub struct YahooMarketDataRepository {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    client: Client,
}

impl YahooMarketDataRepository {
    pub fn new(base_url: String, timeout_ms: u64, retries: u32) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("tickerscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            base_url,
            timeout_ms,
            retries,
            client,
        })
    }

    pub fn fetch_detailed(&self, query: &BarQuery) -> YahooCallResult {
        let endpoint = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            query.ticker.as_str()
        );
        let span = tracing::info_span!(
            "infra.yahoo.chart",
            ticker = %query.ticker,
            endpoint = %endpoint,
            timeout_ms = self.timeout_ms,
            retries = self.retries
        );
        let _enter = span.enter();

        let start = Instant::now();
        let mut attempts = 0u32;
        let mut last_status: Option<u16> = None;

        let outcome = match period_bounds(&query.range) {
            Ok((period1, period2)) => {
                let params = [
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("interval", "1d".to_string()),
                ];
                self.request_with_retries(&endpoint, &params, &query.range, &mut attempts, &mut last_status)
            }
            Err(err) => Err(err),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let result_label = if outcome.is_ok() { "ok" } else { "err" };
        metrics::histogram!("tickerscope.infra.yahoo.call_ms", "result" => result_label)
            .record(duration_ms as f64);
        metrics::histogram!("tickerscope.infra.yahoo.attempts").record(attempts as f64);
        if let Err(err) = &outcome {
            tracing::warn!(
                attempts,
                status = ?last_status,
                error = %err,
                "yahoo chart request failed"
            );
        }

        YahooCallResult {
            info: YahooCallInfo {
                attempts,
                duration_ms,
                status: last_status,
            },
            outcome,
        }
    }

    fn request_with_retries(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        range: &DateRange,
        attempts: &mut u32,
        last_status: &mut Option<u16>,
    ) -> Result<(Vec<Bar>, DataQualityReport), FetchError> {
        let mut last_error = FetchError::Request("yahoo request failed after retries".to_string());

        while *attempts <= self.retries {
            *attempts += 1;
            if *attempts > 1 {
                metrics::counter!("tickerscope.infra.yahoo.retries_total").increment(1);
                tracing::debug!(attempt = *attempts, "retrying yahoo request");
            }

            metrics::counter!("tickerscope.infra.yahoo.requests_total").increment(1);
            let attempt_start = Instant::now();
            match self.client.get(endpoint).query(params).send() {
                Ok(resp) => {
                    let status = resp.status();
                    *last_status = Some(status.as_u16());
                    metrics::histogram!(
                        "tickerscope.infra.yahoo.attempt_ms",
                        "status" => status.as_u16().to_string()
                    )
                    .record(attempt_start.elapsed().as_millis() as f64);
                    tracing::debug!(attempt = *attempts, status = status.as_u16(), "yahoo response");

                    if status == StatusCode::OK {
                        let body = resp.text().map_err(|err| {
                            FetchError::Request(format!("failed to read yahoo response: {err}"))
                        })?;
                        let bars = parse_chart(&body, range)?;
                        return Ok(canonicalize_bars(bars));
                    }
                    if status == StatusCode::NOT_FOUND {
                        return Ok((Vec::new(), DataQualityReport::default()));
                    }
                    if is_transient(status) && *attempts <= self.retries {
                        last_error =
                            FetchError::Api(format!("yahoo http error: status {}", status.as_u16()));
                        continue;
                    }
                    return Err(FetchError::Api(format!(
                        "yahoo http error: status {}",
                        status.as_u16()
                    )));
                }
                Err(err) => {
                    metrics::histogram!("tickerscope.infra.yahoo.attempt_ms", "status" => "err")
                        .record(attempt_start.elapsed().as_millis() as f64);
                    last_error = FetchError::Request(format!("yahoo request failed: {err}"));
                }
            }
        }

        Err(last_error)
    }
}

impl MarketDataRepository for YahooMarketDataRepository {
    fn fetch_bars(&self, query: &BarQuery) -> Result<(Vec<Bar>, DataQualityReport), FetchError> {
        self.fetch_detailed(query).outcome
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// `period1` is midnight UTC of the day before the start date, so exchanges
/// east of UTC still return their first session; `period2` is the day after
/// the end date so the end date itself is included. Bars are filtered to the
/// range again by exchange-local date.
fn period_bounds(range: &DateRange) -> Result<(i64, i64), FetchError> {
    let midnight = |date: NaiveDate| {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| FetchError::Request(format!("invalid date {date}")))
    };
    let before_start = range
        .start()
        .pred_opt()
        .ok_or_else(|| FetchError::Request(format!("no day before {}", range.start())))?;
    let after_end = range
        .end()
        .succ_opt()
        .ok_or_else(|| FetchError::Request(format!("no day after {}", range.end())))?;
    Ok((midnight(before_start)?, midnight(after_end)?))
}

/// Converts a chart payload to bars inside `range`. Only the first quote column is
/// read; rows without a close are dropped and missing open/high/low fall back to
/// the close. Dates are taken in the exchange's local time (`meta.gmtoffset`).
fn parse_chart(body: &str, range: &DateRange) -> Result<Vec<Bar>, FetchError> {
    let parsed: ChartResponse = serde_json::from_str(body)
        .map_err(|err| FetchError::Decode(format!("invalid chart payload: {err}")))?;

    if let Some(err) = parsed.chart.error {
        if err.code == NOT_FOUND_CODE {
            return Ok(Vec::new());
        }
        return Err(FetchError::Api(format!("{}: {}", err.code, err.description)));
    }

    let Some(data) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let offset = data.meta.unwrap_or_default().gmtoffset;
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (idx, ts) in timestamps.iter().copied().enumerate() {
        let Some(close) = column_value(&quote.close, idx) else {
            continue;
        };
        let date = ts
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .map(|dt| dt.date_naive())
            .ok_or_else(|| FetchError::Decode(format!("invalid timestamp {ts}")))?;
        if !range.contains(date) {
            continue;
        }
        bars.push(Bar {
            date,
            open: column_value(&quote.open, idx).unwrap_or(close),
            high: column_value(&quote.high, idx).unwrap_or(close),
            low: column_value(&quote.low, idx).unwrap_or(close),
            close,
            volume: column_value(&quote.volume, idx).unwrap_or(0.0),
        });
    }
    Ok(bars)
}

fn column_value(column: &[Option<f64>], idx: usize) -> Option<f64> {
    column.get(idx).copied().flatten()
}
