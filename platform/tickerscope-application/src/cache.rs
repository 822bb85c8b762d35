use std::time::{Duration, Instant};
use tickerscope_domain::errors::FetchError;
use tickerscope_domain::services::ohlcv::DataQualityReport;
use tickerscope_domain::value_objects::bar::Bar;
use tickerscope_domain::value_objects::date_range::DateRange;
use tickerscope_domain::value_objects::ticker::Ticker;

/// Normalized `(tickers, start, end)` request identity. Moving-average windows are
/// not part of it: changing them re-derives from cached bars.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tickers: Vec<Ticker>,
    pub range: DateRange,
}

pub type FetchOutcome = Result<(Vec<Bar>, DataQualityReport), FetchError>;

#[derive(Debug, Clone)]
pub struct TickerFetch {
    pub ticker: Ticker,
    pub outcome: FetchOutcome,
}

#[derive(Debug)]
struct CacheEntry {
    key: CacheKey,
    stored_at: Instant,
    fetches: Vec<TickerFetch>,
}

/// Single-entry memo of the last fully successful fetch.
#[derive(Debug)]
pub struct FetchCache {
    enabled: bool,
    ttl: Option<Duration>,
    entry: Option<CacheEntry>,
}

impl FetchCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            enabled: true,
            ttl,
            entry: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ttl: None,
            entry: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn lookup(&self, key: &CacheKey, now: Instant) -> Option<&[TickerFetch]> {
        let entry = self.entry.as_ref()?;
        if entry.key != *key {
            return None;
        }
        if let Some(ttl) = self.ttl {
            if now.saturating_duration_since(entry.stored_at) >= ttl {
                return None;
            }
        }
        Some(&entry.fetches)
    }

    /// Replaces the memo. Results containing a fetch failure are not kept so a
    /// transient error is retried on the next pass; the previous entry is dropped
    /// either way.
    pub fn store(&mut self, key: CacheKey, fetches: &[TickerFetch], now: Instant) -> bool {
        self.entry = None;
        if !self.enabled || fetches.iter().any(|f| f.outcome.is_err()) {
            return false;
        }
        self.entry = Some(CacheEntry {
            key,
            stored_at: now,
            fetches: fetches.to_vec(),
        });
        true
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
