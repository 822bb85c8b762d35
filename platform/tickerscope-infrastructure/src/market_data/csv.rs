use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tickerscope_domain::errors::FetchError;
use tickerscope_domain::repositories::market_data::{BarQuery, MarketDataRepository};
use tickerscope_domain::services::ohlcv::{canonicalize_bars, DataQualityReport};
use tickerscope_domain::value_objects::bar::Bar;

#[derive(Debug, Deserialize)]
struct DailyRecord {
    date: NaiveDate,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

/// Reads `<dir>/<TICKER>.csv` files with a `date,open,high,low,close,volume` header.
/// A missing file is an unknown ticker.
#[derive(Debug, Clone)]
pub struct CsvMarketDataRepository {
    dir: PathBuf,
}

impl CsvMarketDataRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, query: &BarQuery) -> PathBuf {
        self.dir.join(format!("{}.csv", query.ticker.as_str()))
    }
}

impl MarketDataRepository for CsvMarketDataRepository {
    fn fetch_bars(&self, query: &BarQuery) -> Result<(Vec<Bar>, DataQualityReport), FetchError> {
        let path = self.path_for(query);
        let _span = tracing::info_span!("infra.csv.load", path = %path.display()).entered();

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("no csv file for ticker");
                return Ok((Vec::new(), DataQualityReport::default()));
            }
            Err(err) => {
                return Err(FetchError::Request(format!(
                    "failed to open {}: {err}",
                    path.display()
                )))
            }
        };

        let bars = read_bars(file, query)?;
        metrics::counter!("tickerscope.infra.csv.rows_total").increment(bars.len() as u64);
        Ok(canonicalize_bars(bars))
    }
}

fn read_bars(file: File, query: &BarQuery) -> Result<Vec<Bar>, FetchError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let mut bars = Vec::new();
    for (idx, result) in reader.deserialize::<DailyRecord>().enumerate() {
        let record = result
            .map_err(|err| FetchError::Decode(format!("failed to parse CSV row {}: {err}", idx + 1)))?;
        let Some(close) = record.close else {
            continue;
        };
        if !query.range.contains(record.date) {
            continue;
        }
        bars.push(Bar {
            date: record.date,
            open: record.open.unwrap_or(close),
            high: record.high.unwrap_or(close),
            low: record.low.unwrap_or(close),
            close,
            volume: record.volume.unwrap_or(0.0),
        });
    }
    Ok(bars)
}
