use crate::entities::derived_series::DerivedSeries;
use crate::entities::summary::Summary;
use crate::errors::DashboardError;
use std::path::Path;

pub trait ArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String>;
    fn write_series_csv(&self, path: &Path, series: &DerivedSeries) -> Result<(), String>;
    fn write_comparison_csv(&self, path: &Path, series: &[&DerivedSeries]) -> Result<(), String>;
    fn write_summary_json(
        &self,
        path: &Path,
        summaries: &[Summary],
        issues: &[DashboardError],
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String>;
    fn write_config_snapshot_toml(&self, path: &Path, contents: &str) -> Result<(), String>;
}
