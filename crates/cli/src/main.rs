use std::{iter, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser};
use scenepatch_protocol::PluginConfig;
use scenepatch_telemetry::TelemetryConfig;
use tracing::{debug, info};

use crate::{
    commands::Commands,
    config::{Config, KnownDirs, Options},
};

mod commands;
mod config;
pub mod output;

#[derive(Parser, Debug)]
#[command(
    name = "scenepatch",
    version,
    about = "Run scene and picture patches against a simulated engine",
    propagate_version = true,
    flatten_help = true
)]
struct Cli {
    #[clap(flatten)]
    options: Options,

    /// Disable tracing logs and diagnostics.
    #[clap(short, long, action = ArgAction::SetTrue)]
    quiet: bool,

    /// Additional configuration file, applied after the discovered ones.
    #[clap(long, value_hint = clap::ValueHint::FilePath)]
    config_file: Option<PathBuf>,

    /// Also write logs to this file.
    #[clap(long, value_hint = clap::ValueHint::FilePath)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    scenepatch_telemetry::install_error_handler();

    let cli = Cli::parse();

    let telemetry_config = TelemetryConfig::default()
        .with_console(!cli.quiet)
        .with_log_file(cli.log_file.as_deref())
        .with_default_filter("warn");

    let _telemetry_guard = scenepatch_telemetry::install(telemetry_config);

    info!(version = env!("CARGO_PKG_VERSION"));

    let known_dirs = KnownDirs::default();
    let config_files = known_dirs
        .config_files()
        .inspect(|path| debug!(?path, "searching for configuration in"))
        .filter(|path| path.exists())
        .chain(cli.config_file.map(PathBuf::into_boxed_path));

    let plugins = iter::once(PluginConfig::from_files(config_files))
        .chain(iter::once(cli.options.into_layer()))
        .fold(PluginConfig::default(), PluginConfig::merge);

    let config = Config {
        known_dirs,
        plugins,
    };

    let result = scenepatch_telemetry::with_root_span("scenepatch", "run command", || {
        match cli.command {
            Commands::Run(args) => commands::run::run(&config, args),
            Commands::Config(args) => commands::config::show(&config, args),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}
