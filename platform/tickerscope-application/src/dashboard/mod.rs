use crate::cache::{FetchCache, TickerFetch};
use crate::request::DashboardRequest;
use std::time::Instant;
use tickerscope_domain::entities::derived_series::DerivedSeries;
use tickerscope_domain::entities::summary::Summary;
use tickerscope_domain::errors::DashboardError;
use tickerscope_domain::repositories::market_data::{BarQuery, MarketDataRepository};
use tickerscope_domain::services::metrics::{derive, summarize};
use tickerscope_domain::services::ohlcv::DataQualityReport;
use tickerscope_domain::value_objects::bar_series::BarSeries;
use tracing::{debug, info, info_span, warn};

#[derive(Debug, Clone)]
pub struct TickerReport {
    pub series: DerivedSeries,
    pub summary: Summary,
    pub quality: DataQualityReport,
}

#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub request: DashboardRequest,
    pub tickers: Vec<TickerReport>,
    pub issues: Vec<DashboardError>,
    pub from_cache: bool,
}

impl DashboardReport {
    pub fn summaries(&self) -> Vec<Summary> {
        self.tickers.iter().map(|t| t.summary.clone()).collect()
    }

    pub fn is_empty_result_set(&self) -> bool {
        self.tickers.is_empty()
    }

    /// `Err(EmptyResultSet)` when no ticker produced data.
    pub fn outcome(&self) -> Result<(), DashboardError> {
        if self.is_empty_result_set() {
            return Err(DashboardError::EmptyResultSet);
        }
        Ok(())
    }

    /// Tickers that were requested but produced no summary.
    pub fn missing_tickers(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.skips_ticker())
            .filter_map(|issue| issue.ticker())
            .collect()
    }
}

/// One fetch-derive-summarize pass. Tickers are fetched sequentially; a failing
/// or empty ticker is recorded as an issue and the pass moves on.
pub fn run_dashboard(
    request: &DashboardRequest,
    market_data: &dyn MarketDataRepository,
    cache: &mut FetchCache,
) -> DashboardReport {
    let _span = info_span!(
        "dashboard",
        tickers = request.tickers.len(),
        start = %request.range.start(),
        end = %request.range.end(),
        ma_short = request.windows.short(),
        ma_long = request.windows.long()
    )
    .entered();

    let pass_start = Instant::now();
    let key = request.cache_key();
    let cached = cache.lookup(&key, pass_start).map(<[TickerFetch]>::to_vec);
    let from_cache = cached.is_some();
    let fetches = match cached {
        Some(fetches) => {
            metrics::counter!("tickerscope.fetch.cache_hits").increment(1);
            debug!("serving bars from fetch cache");
            fetches
        }
        None => {
            let fetches = fetch_all(request, market_data);
            cache.store(key, &fetches, Instant::now());
            fetches
        }
    };

    let mut tickers = Vec::with_capacity(fetches.len());
    let mut issues = Vec::new();

    for fetch in fetches {
        let name = fetch.ticker.to_string();
        let (bars, quality) = match fetch.outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(ticker = %name, error = %err, "fetch failed; skipping ticker");
                issues.push(DashboardError::FetchFailure {
                    ticker: name,
                    message: err.to_string(),
                });
                continue;
            }
        };

        if bars.is_empty() {
            warn!(ticker = %name, "no data returned; skipping ticker");
            issues.push(DashboardError::NoDataForTicker { ticker: name });
            continue;
        }

        let series = match BarSeries::new(fetch.ticker, bars) {
            Ok(series) => series,
            Err(message) => {
                warn!(ticker = %name, error = %message, "provider broke ordering contract");
                issues.push(DashboardError::FetchFailure {
                    ticker: name,
                    message,
                });
                continue;
            }
        };

        let derived = derive(&series, request.windows);
        let Some(summary) = summarize(&derived) else {
            issues.push(DashboardError::NoDataForTicker { ticker: name });
            continue;
        };

        for quantity in summary.undefined_fields() {
            issues.push(DashboardError::DivisionUndefined {
                ticker: name.clone(),
                quantity,
            });
        }

        tickers.push(TickerReport {
            series: derived,
            summary,
            quality,
        });
    }

    if tickers.is_empty() {
        warn!("no data found for any requested ticker");
        issues.push(DashboardError::EmptyResultSet);
    }

    metrics::gauge!("tickerscope.dashboard.tickers_ready").set(tickers.len() as f64);
    metrics::histogram!("tickerscope.dashboard.pass_ms")
        .record(pass_start.elapsed().as_millis() as f64);
    info!(
        ready = tickers.len(),
        issues = issues.len(),
        from_cache,
        "dashboard pass complete"
    );

    DashboardReport {
        request: request.clone(),
        tickers,
        issues,
        from_cache,
    }
}

fn fetch_all(request: &DashboardRequest, market_data: &dyn MarketDataRepository) -> Vec<TickerFetch> {
    request
        .tickers
        .iter()
        .map(|ticker| {
            let fetch_start = Instant::now();
            let outcome = market_data.fetch_bars(&BarQuery {
                ticker: ticker.clone(),
                range: request.range,
            });
            metrics::histogram!("tickerscope.fetch.ms")
                .record(fetch_start.elapsed().as_millis() as f64);
            match &outcome {
                Ok((bars, quality)) => {
                    if !quality.is_clean() {
                        warn!(
                            ticker = %ticker,
                            duplicates = quality.duplicates,
                            out_of_order = quality.out_of_order,
                            invalid_close = quality.invalid_close,
                            invalid_volume = quality.invalid_volume,
                            "provider data needed cleanup"
                        );
                    }
                    debug!(ticker = %ticker, bars = bars.len(), "fetched bars");
                }
                Err(_) => metrics::counter!("tickerscope.fetch.failures").increment(1),
            }
            TickerFetch {
                ticker: ticker.clone(),
                outcome,
            }
        })
        .collect()
}
