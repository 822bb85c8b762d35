pub mod common;
pub mod fetch;
pub mod validate;
pub mod watch;

use std::path::PathBuf;
use tickerscope_application::request::RequestOverrides;

/// Where the config comes from and what the command line overrides in it.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    pub config_path: Option<PathBuf>,
    pub overrides: RequestOverrides,
    pub out_dir: Option<PathBuf>,
}
