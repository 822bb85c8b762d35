use crate::value_objects::ticker::Ticker;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub ticker: Ticker,
    pub current_price: f64,
    pub start_price: f64,
    /// `None` when the start price is zero.
    pub total_return: Option<f64>,
    /// Annualized; `None` with fewer than two defined daily returns.
    pub volatility: Option<f64>,
    pub bars: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl Summary {
    pub fn undefined_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.total_return.is_none() {
            fields.push("total_return");
        }
        if self.volatility.is_none() {
            fields.push("volatility");
        }
        fields
    }
}
