use crate::errors::FetchError;
use crate::services::ohlcv::DataQualityReport;
use crate::value_objects::bar::Bar;
use crate::value_objects::date_range::DateRange;
use crate::value_objects::ticker::Ticker;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BarQuery {
    pub ticker: Ticker,
    pub range: DateRange,
}

/// Daily bar source. Implementations return an empty vector for unknown tickers,
/// collapse multi-column responses to a single close per bar and hand back bars
/// sorted by strictly increasing date.
pub trait MarketDataRepository {
    fn fetch_bars(&self, query: &BarQuery) -> Result<(Vec<Bar>, DataQualityReport), FetchError>;
}
