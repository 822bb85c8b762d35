use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tickerscope::commands::fetch::FetchOptions;
use tickerscope::commands::watch::WatchOptions;
use tickerscope::commands::{self, ConfigSource};
use tickerscope::obs::{self, LogFormat};
use tickerscope_application::request::RequestOverrides;

#[derive(Parser, Debug)]
#[command(name = "tickerscope")]
#[command(
    about = "Stock dashboard: daily bars, moving averages, returns and volatility per ticker.",
    version
)]
struct Cli {
    /// Config file path (TOML). If omitted, uses env TICKERSCOPE_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format (filter with env TICKERSCOPE_LOG).
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    log_format: LogFormatArg,

    /// Prometheus metrics listen addr (e.g. 127.0.0.1:9898). Optional.
    #[arg(long, global = true)]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LogFormatArg {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one dashboard pass and print the result.
    Fetch {
        #[command(flatten)]
        request: RequestArgs,

        /// Skip the CSV/JSON export even if output.export_csv is set.
        #[arg(long)]
        no_export: bool,

        /// Print a single JSON line instead of tables.
        #[arg(long)]
        json: bool,
    },
    /// Rerun the dashboard pass on an interval, re-reading the config each time.
    Watch {
        #[command(flatten)]
        request: RequestArgs,

        /// Seconds between passes.
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,

        /// Stop after this many passes.
        #[arg(long)]
        iterations: Option<u32>,

        /// Skip the CSV/JSON export even if output.export_csv is set.
        #[arg(long)]
        no_export: bool,
    },
    /// Fetch every ticker and report row counts and data quality without deriving.
    Validate {
        #[command(flatten)]
        request: RequestArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct RequestArgs {
    /// Comma-separated tickers, e.g. "AAPL, MSFT".
    #[arg(long)]
    tickers: Option<String>,

    /// First date (YYYY-MM-DD). Replaces request.days.
    #[arg(long, conflicts_with = "days")]
    start: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Trailing calendar days ending at --end (30-365).
    #[arg(long)]
    days: Option<u32>,

    /// Short moving-average window (5-50).
    #[arg(long)]
    short: Option<u32>,

    /// Long moving-average window (20-200).
    #[arg(long)]
    long: Option<u32>,

    /// Output directory for exports.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl RequestArgs {
    fn into_source(self, config_path: Option<PathBuf>) -> ConfigSource {
        ConfigSource {
            config_path,
            overrides: RequestOverrides {
                tickers: self.tickers,
                start: self.start,
                end: self.end,
                days: self.days,
                ma_short: self.short,
                ma_long: self.long,
            },
            out_dir: self.out,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_format = match cli.log_format {
        LogFormatArg::Text => LogFormat::Text,
        LogFormatArg::Json => LogFormat::Json,
    };
    if let Err(err) = obs::init_tracing(log_format) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = obs::init_metrics(cli.metrics_addr.as_deref()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let config_path = cli.config.or_else(|| {
        std::env::var("TICKERSCOPE_CONFIG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    });

    let result = match cli.command {
        Command::Fetch {
            request,
            no_export,
            json,
        } => commands::fetch::run(&FetchOptions {
            source: request.into_source(config_path),
            no_export,
            json,
        }),
        Command::Watch {
            request,
            interval_secs,
            iterations,
            no_export,
        } => commands::watch::run(&WatchOptions {
            source: request.into_source(config_path),
            interval: Duration::from_secs(interval_secs),
            iterations,
            no_export,
        }),
        Command::Validate { request } => {
            commands::validate::run(&request.into_source(config_path)).and_then(|json| {
                serde_json::to_string(&json)
                    .map(|line| println!("{line}"))
                    .map_err(|err| format!("failed to serialize validation report: {err}"))
            })
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
