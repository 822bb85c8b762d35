use super::ConfigSource;
use std::time::Duration;
use tickerscope_application::cache::FetchCache;
use tickerscope_application::config::{self, CacheConfig, Config};
use tickerscope_application::request::{resolve_request, DashboardRequest};

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Effective config after command-line overrides, as TOML.
    pub snapshot: String,
}

pub fn load(source: &ConfigSource) -> Result<LoadedConfig, String> {
    let mut config = match source.config_path.as_deref() {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    source.overrides.apply(&mut config.request);
    if let Some(out_dir) = &source.out_dir {
        config.output.out_dir = out_dir.display().to_string();
    }
    let snapshot = config::to_toml_pretty(&config)?;
    Ok(LoadedConfig { config, snapshot })
}

pub fn resolve(config: &Config) -> Result<DashboardRequest, String> {
    resolve_request(&config.request, chrono::Local::now().date_naive())
}

pub fn build_cache(cache: &CacheConfig) -> FetchCache {
    if !cache.enabled {
        return FetchCache::disabled();
    }
    FetchCache::new(cache.ttl_secs.map(Duration::from_secs))
}

pub fn print_config_summary(config: &Config, request: &DashboardRequest) {
    tracing::info!(
        provider = ?config.provider.kind,
        tickers = request.tickers.len(),
        start = %request.range.start(),
        end = %request.range.end(),
        ma_short = request.windows.short(),
        ma_long = request.windows.long(),
        out_dir = %config.output.out_dir,
        export_csv = config.output.export_csv,
        cache = config.cache.enabled,
        "config loaded"
    );
}
