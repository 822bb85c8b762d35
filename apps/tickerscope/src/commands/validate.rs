use super::common::{load, print_config_summary, resolve};
use super::ConfigSource;
use crate::infra::build_market_data_repo;

/// Resolves the request and fetches each ticker without deriving anything.
pub fn run(source: &ConfigSource) -> Result<serde_json::Value, String> {
    let loaded = load(source)?;
    let request = resolve(&loaded.config)?;
    print_config_summary(&loaded.config, &request);

    let market_data = build_market_data_repo(&loaded.config.provider)?;
    let report = tickerscope_application::validation::validate(&request, market_data.as_ref());
    Ok(serde_json::json!({
        "status": "ok",
        "mode": "validate",
        "provider": loaded.config.provider.kind,
        "report": report,
    }))
}
