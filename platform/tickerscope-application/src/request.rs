use crate::cache::CacheKey;
use crate::config::{RequestConfig, DEFAULT_DAYS};
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::ops::RangeInclusive;
use tickerscope_domain::value_objects::date_range::DateRange;
use tickerscope_domain::value_objects::ma_windows::MaWindows;
use tickerscope_domain::value_objects::ticker::Ticker;

pub const MA_SHORT_BOUNDS: RangeInclusive<u32> = 5..=50;
pub const MA_LONG_BOUNDS: RangeInclusive<u32> = 20..=200;
pub const DAYS_BOUNDS: RangeInclusive<u32> = 30..=365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    pub tickers: Vec<Ticker>,
    pub range: DateRange,
    pub windows: MaWindows,
}

impl DashboardRequest {
    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            tickers: self.tickers.clone(),
            range: self.range,
        }
    }

    /// Stable short id for the request, used to name export directories.
    pub fn run_id(&self) -> String {
        let mut hasher = Sha256::new();
        for ticker in &self.tickers {
            hasher.update(ticker.as_str().as_bytes());
            hasher.update(b",");
        }
        hasher.update(b"\n");
        hasher.update(self.range.start().to_string().as_bytes());
        hasher.update(b"..");
        hasher.update(self.range.end().to_string().as_bytes());
        hasher.update(b"\n");
        hasher.update(self.windows.short().to_string().as_bytes());
        hasher.update(b"/");
        hasher.update(self.windows.long().to_string().as_bytes());
        let bytes = hasher.finalize();
        format!(
            "{}_{}",
            self.range.end().format("%Y%m%d"),
            to_hex_short(&bytes[..], 12)
        )
    }
}

/// Overrides coming from the command line; `None` keeps the config value.
#[derive(Debug, Clone, Default)]
pub struct RequestOverrides {
    pub tickers: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub days: Option<u32>,
    pub ma_short: Option<u32>,
    pub ma_long: Option<u32>,
}

impl RequestOverrides {
    pub fn apply(&self, config: &mut RequestConfig) {
        if let Some(tickers) = &self.tickers {
            config.tickers = tickers.clone();
        }
        // An explicit start and a trailing day count are mutually exclusive.
        if let Some(start) = self.start {
            config.start = Some(start);
            config.days = None;
        }
        if let Some(days) = self.days {
            config.days = Some(days);
            config.start = None;
        }
        if let Some(end) = self.end {
            config.end = Some(end);
        }
        if let Some(ma_short) = self.ma_short {
            config.ma_short = ma_short;
        }
        if let Some(ma_long) = self.ma_long {
            config.ma_long = ma_long;
        }
    }
}

/// Splits on commas, trims and uppercases. Empty entries are dropped; duplicates are kept.
pub fn parse_tickers(input: &str) -> Vec<Ticker> {
    input
        .split(',')
        .filter_map(|raw| Ticker::parse(raw).ok())
        .collect()
}

pub fn resolve_request(config: &RequestConfig, today: NaiveDate) -> Result<DashboardRequest, String> {
    let tickers = parse_tickers(&config.tickers);
    if tickers.is_empty() {
        return Err("request.tickers must list at least one ticker".to_string());
    }
    if let Some(bad) = config
        .tickers
        .split(',')
        .map(str::trim)
        .find(|raw| !raw.is_empty() && Ticker::parse(raw).is_err())
    {
        return Err(format!("request.tickers contains an invalid ticker: {bad:?}"));
    }

    check_bounds("request.ma_short", config.ma_short, &MA_SHORT_BOUNDS)?;
    check_bounds("request.ma_long", config.ma_long, &MA_LONG_BOUNDS)?;
    let windows = MaWindows::new(config.ma_short as usize, config.ma_long as usize)?;

    let end = config.end.unwrap_or(today);
    let range = match (config.start, config.days) {
        (Some(_), Some(_)) => {
            return Err("set either request.start or request.days, not both".to_string())
        }
        (Some(start), None) => DateRange::new(start, end)?,
        (None, Some(days)) => {
            check_bounds("request.days", days, &DAYS_BOUNDS)?;
            DateRange::trailing_days(end, days)?
        }
        (None, None) => DateRange::trailing_days(end, DEFAULT_DAYS)?,
    };

    Ok(DashboardRequest {
        tickers,
        range,
        windows,
    })
}

fn check_bounds(name: &str, value: u32, bounds: &RangeInclusive<u32>) -> Result<(), String> {
    if bounds.contains(&value) {
        return Ok(());
    }
    Err(format!(
        "{name} must be between {} and {} (got {value})",
        bounds.start(),
        bounds.end()
    ))
}

fn to_hex_short(bytes: &[u8], chars: usize) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(chars);
    for b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        if out.len() >= chars {
            break;
        }
        out.push(HEX[(b & 0x0f) as usize] as char);
        if out.len() >= chars {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{parse_tickers, resolve_request, RequestOverrides};
    use crate::config::RequestConfig;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn parse_tickers_normalizes_and_keeps_duplicates() {
        let tickers = parse_tickers(" aapl,MSFT , ,aapl,");
        let names: Vec<&str> = tickers.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["AAPL", "MSFT", "AAPL"]);
    }

    #[test]
    fn default_request_covers_trailing_180_days() {
        let request =
            resolve_request(&RequestConfig::default(), date(2024, 7, 1)).expect("request");
        assert_eq!(request.tickers.len(), 3);
        assert_eq!(request.range.end(), date(2024, 7, 1));
        assert_eq!(request.range.start(), date(2024, 1, 3));
        assert_eq!(request.windows.short(), 20);
        assert_eq!(request.windows.long(), 50);
    }

    #[test]
    fn explicit_dates_are_used_as_given() {
        let config = RequestConfig {
            start: Some(date(2024, 1, 2)),
            end: Some(date(2024, 3, 28)),
            ..RequestConfig::default()
        };
        let request = resolve_request(&config, date(2030, 1, 1)).expect("request");
        assert_eq!(request.range.start(), date(2024, 1, 2));
        assert_eq!(request.range.end(), date(2024, 3, 28));
    }

    #[test]
    fn rejects_out_of_bounds_windows_and_days() {
        let today = date(2024, 7, 1);
        let mut config = RequestConfig {
            ma_short: 4,
            ..RequestConfig::default()
        };
        let err = resolve_request(&config, today).expect_err("ma_short too small");
        assert!(err.contains("request.ma_short must be between 5 and 50"));

        config.ma_short = 20;
        config.ma_long = 201;
        assert!(resolve_request(&config, today).is_err());

        config.ma_long = 50;
        config.days = Some(10);
        let err = resolve_request(&config, today).expect_err("days too small");
        assert!(err.contains("request.days"));
    }

    #[test]
    fn rejects_start_and_days_together_and_empty_tickers() {
        let today = date(2024, 7, 1);
        let config = RequestConfig {
            start: Some(date(2024, 1, 1)),
            days: Some(60),
            ..RequestConfig::default()
        };
        assert!(resolve_request(&config, today).is_err());

        let config = RequestConfig {
            tickers: " , ".to_string(),
            ..RequestConfig::default()
        };
        assert!(resolve_request(&config, today).is_err());

        let config = RequestConfig {
            tickers: "AAPL, BRK B".to_string(),
            ..RequestConfig::default()
        };
        let err = resolve_request(&config, today).expect_err("inner whitespace");
        assert!(err.contains("BRK B"));
    }

    #[test]
    fn overrides_switch_between_start_and_days() {
        let mut config = RequestConfig {
            start: Some(date(2024, 1, 1)),
            ..RequestConfig::default()
        };
        RequestOverrides {
            days: Some(90),
            ma_short: Some(10),
            ..RequestOverrides::default()
        }
        .apply(&mut config);
        assert_eq!(config.start, None);
        assert_eq!(config.days, Some(90));
        assert_eq!(config.ma_short, 10);

        RequestOverrides {
            start: Some(date(2024, 2, 1)),
            tickers: Some("nvda".to_string()),
            ..RequestOverrides::default()
        }
        .apply(&mut config);
        assert_eq!(config.days, None);
        assert_eq!(config.tickers, "nvda");
    }

    #[test]
    fn run_id_changes_with_windows() {
        let today = date(2024, 7, 1);
        let a = resolve_request(&RequestConfig::default(), today).expect("request");
        let mut config = RequestConfig::default();
        config.ma_short = 10;
        let b = resolve_request(&config, today).expect("request");
        assert_ne!(a.run_id(), b.run_id());
        assert_eq!(a.run_id(), a.clone().run_id());
        assert!(a.run_id().starts_with("20240701_"));
        assert_eq!(a.cache_key(), b.cache_key());
    }
}
