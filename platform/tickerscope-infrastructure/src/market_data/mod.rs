pub mod csv;
pub mod yahoo;

pub use self::csv::CsvMarketDataRepository;
pub use self::yahoo::YahooMarketDataRepository;
