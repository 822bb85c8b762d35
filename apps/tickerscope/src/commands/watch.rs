use super::common::{build_cache, load, print_config_summary, resolve};
use super::fetch::export;
use super::ConfigSource;
use crate::infra::build_market_data_repo;
use crate::output::render_report;
use std::thread;
use std::time::Duration;
use tickerscope_application::cache::FetchCache;
use tickerscope_application::config::CacheConfig;
use tickerscope_application::dashboard::{run_dashboard, DashboardReport};

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub source: ConfigSource,
    pub interval: Duration,
    /// Stop after this many passes; run until interrupted when `None`.
    pub iterations: Option<u32>,
    pub no_export: bool,
}

/// State carried from one pass to the next.
#[derive(Debug)]
struct WatchState {
    cache: FetchCache,
    cache_config: Option<CacheConfig>,
    provider: Option<String>,
}

impl WatchState {
    fn new() -> Self {
        Self {
            cache: FetchCache::disabled(),
            cache_config: None,
            provider: None,
        }
    }
}

/// Reruns the dashboard pass on an interval, re-reading the config each time.
/// Passes share one fetch cache, so a pass that only changes the moving
/// average windows is served without refetching. A changed `[cache]` section
/// rebuilds the cache and a changed `[provider]` section empties it.
pub fn run(options: &WatchOptions) -> Result<(), String> {
    let mut state = WatchState::new();
    let mut pass = 0u32;

    loop {
        pass += 1;
        metrics::counter!("tickerscope.watch.passes").increment(1);
        let result = {
            let _span = tracing::info_span!("watch_pass", pass).entered();
            run_pass(options, &mut state).map(|_| ())
        };
        check_pass(pass, result)?;

        if options.iterations.is_some_and(|limit| pass >= limit) {
            return Ok(());
        }
        thread::sleep(options.interval);
    }
}

/// A failed first pass ends the watch; later failures are logged and the
/// next interval tries again.
fn check_pass(pass: u32, result: Result<(), String>) -> Result<(), String> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if pass == 1 => Err(err),
        Err(err) => {
            tracing::warn!(pass, error = %err, "watch pass failed; retrying next interval");
            Ok(())
        }
    }
}

fn run_pass(options: &WatchOptions, state: &mut WatchState) -> Result<DashboardReport, String> {
    let loaded = load(&options.source)?;
    let request = resolve(&loaded.config)?;
    print_config_summary(&loaded.config, &request);

    if state.cache_config.as_ref() != Some(&loaded.config.cache) {
        if state.cache_config.is_some() {
            tracing::info!("cache config changed; rebuilding fetch cache");
        }
        state.cache = build_cache(&loaded.config.cache);
        state.cache_config = Some(loaded.config.cache.clone());
    }

    // Cached bars came from the previous provider.
    let provider = toml::to_string(&loaded.config.provider)
        .map_err(|err| format!("failed to serialize provider config: {err}"))?;
    if state.provider.as_deref().is_some_and(|prev| prev != provider) {
        tracing::info!("provider config changed; dropping fetch cache");
        state.cache.invalidate();
    }
    state.provider = Some(provider);

    let market_data = build_market_data_repo(&loaded.config.provider)?;
    let report = run_dashboard(&request, market_data.as_ref(), &mut state.cache);
    print!("{}", render_report(&report));

    if loaded.config.output.export_csv && !options.no_export {
        let run_dir = export(&report, &loaded.config.output.out_dir, &loaded.snapshot)?;
        println!("exported to {run_dir}");
    }
    println!();
    Ok(report)
}
