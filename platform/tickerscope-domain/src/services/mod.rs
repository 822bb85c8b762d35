pub mod format;
pub mod metrics;
pub mod ohlcv;
