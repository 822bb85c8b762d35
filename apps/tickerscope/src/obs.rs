use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logs go to stderr so stdout stays clean for tables and JSON.
pub fn init_tracing(format: LogFormat) -> Result<(), String> {
    let filter = std::env::var("TICKERSCOPE_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|err| format!("failed to init tracing: {err}"))
}

fn resolve_metrics_addr(flag: Option<&str>) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| std::env::var("TICKERSCOPE_METRICS_ADDR").ok())
        .filter(|raw| !raw.trim().is_empty())
}

#[cfg(feature = "prometheus")]
pub fn init_metrics(flag: Option<&str>) -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = resolve_metrics_addr(flag) else {
        return Ok(None);
    };
    let addr: SocketAddr = raw
        .trim()
        .parse()
        .map_err(|err| format!("invalid metrics addr (expected host:port): {err}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
pub fn init_metrics(flag: Option<&str>) -> Result<Option<SocketAddr>, String> {
    if resolve_metrics_addr(flag).is_some() {
        tracing::warn!("metrics addr ignored: built without the prometheus feature");
    }
    Ok(None)
}
