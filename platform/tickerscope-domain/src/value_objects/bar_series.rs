use crate::value_objects::bar::Bar;
use crate::value_objects::ticker::Ticker;

/// Bars for a single ticker, ascending by date with no duplicate dates.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    ticker: Ticker,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(ticker: Ticker, bars: Vec<Bar>) -> Result<Self, String> {
        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date >= pair[1].date) {
            return Err(format!(
                "bars for {ticker} are not strictly increasing by date ({} then {})",
                pair[0].date, pair[1].date
            ));
        }
        Ok(Self { ticker, bars })
    }

    pub fn empty(ticker: Ticker) -> Self {
        Self {
            ticker,
            bars: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
