use super::common::{build_cache, load, print_config_summary, resolve};
use super::ConfigSource;
use crate::infra::build_market_data_repo;
use crate::output::{render_report, report_json};
use std::path::Path;
use tickerscope_application::dashboard::{run_dashboard, DashboardReport};
use tickerscope_application::reporting::export_report;
use tickerscope_infrastructure::artifacts::FilesystemArtifactWriter;

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub source: ConfigSource,
    pub no_export: bool,
    pub json: bool,
}

/// One dashboard pass. Skipped tickers and an empty result set are reported, not errors.
pub fn run(options: &FetchOptions) -> Result<(), String> {
    let loaded = load(&options.source)?;
    let request = resolve(&loaded.config)?;
    print_config_summary(&loaded.config, &request);

    let market_data = build_market_data_repo(&loaded.config.provider)?;
    let mut cache = build_cache(&loaded.config.cache);
    let report = run_dashboard(&request, market_data.as_ref(), &mut cache);

    let run_dir = if loaded.config.output.export_csv && !options.no_export {
        Some(export(&report, &loaded.config.output.out_dir, &loaded.snapshot)?)
    } else {
        None
    };

    if options.json {
        let mut json = report_json(&report);
        json["run_dir"] = serde_json::json!(run_dir);
        println!(
            "{}",
            serde_json::to_string(&json)
                .map_err(|err| format!("failed to serialize report: {err}"))?
        );
    } else {
        print!("{}", render_report(&report));
        if let Some(run_dir) = &run_dir {
            println!();
            println!("exported to {run_dir}");
        }
    }
    Ok(())
}

pub(crate) fn export(report: &DashboardReport, out_dir: &str, snapshot: &str) -> Result<String, String> {
    let writer = FilesystemArtifactWriter::new();
    let result = export_report(report, Path::new(out_dir), Some(snapshot), &writer)?;
    tracing::info!(
        run_dir = %result.run_dir.display(),
        files = result.files.len(),
        "export complete"
    );
    Ok(result.run_dir.display().to_string())
}
