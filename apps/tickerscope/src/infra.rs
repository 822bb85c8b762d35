use tickerscope_application::config::{ProviderConfig, ProviderKind, DEFAULT_YAHOO_BASE_URL};
use tickerscope_domain::repositories::market_data::MarketDataRepository;
use tickerscope_infrastructure::market_data::{CsvMarketDataRepository, YahooMarketDataRepository};

pub fn build_market_data_repo(
    provider: &ProviderConfig,
) -> Result<Box<dyn MarketDataRepository>, String> {
    match provider.kind {
        ProviderKind::Yahoo => {
            let base_url = provider
                .base_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(DEFAULT_YAHOO_BASE_URL)
                .to_string();
            let repo =
                YahooMarketDataRepository::new(base_url.clone(), provider.timeout_ms, provider.retries)
                    .map_err(|err| {
                        format!("failed to init yahoo provider (base_url={base_url}): {err}")
                    })?;
            Ok(Box::new(repo))
        }
        ProviderKind::Csv => {
            let dir = provider
                .csv_dir
                .as_deref()
                .filter(|dir| !dir.trim().is_empty())
                .ok_or_else(|| "provider.csv_dir is required when provider.kind = \"csv\"".to_string())?;
            Ok(Box::new(CsvMarketDataRepository::new(dir)))
        }
    }
}
