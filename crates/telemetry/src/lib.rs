use std::{io, path::PathBuf};

use tracing::info_span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Keeps background log writers alive. Logs written to a file are flushed when this is dropped.
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
}

#[derive(Debug, Default)]
pub struct TelemetryConfig {
    console: bool,
    log_file: Option<PathBuf>,
    default_filter: Option<String>,
}

impl TelemetryConfig {
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_log_file<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.log_file = path.map(Into::into);
        self
    }

    /// Filter used when `RUST_LOG` is unset. Defaults to `info`.
    pub fn with_default_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.default_filter = Some(filter.into());
        self
    }
}

pub fn install(config: TelemetryConfig) -> TelemetryGuard {
    let TelemetryConfig {
        console,
        log_file,
        default_filter,
    } = config;

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter.as_deref().unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_writer, file_guard) = log_file
        .and_then(|path| {
            let file_name = path.file_name()?.to_owned();
            let directory = path.parent().map(PathBuf::from).unwrap_or_default();

            Some(tracing_appender::non_blocking(
                tracing_appender::rolling::never(directory, file_name),
            ))
        })
        .unzip();

    let result = tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(filter_layer)
        .with(file_writer.map(|writer| {
            fmt::layer()
                .pretty()
                .with_ansi(false)
                .without_time()
                .with_writer(writer)
        }))
        .with(console.then(|| {
            fmt::layer()
                .compact()
                .with_ansi(true)
                .without_time()
                .with_writer(io::stderr)
        }))
        .try_init();

    if let Err(e) = result {
        eprintln!("tracing was already initialized: {e}");
    }

    TelemetryGuard {
        _file_guard: file_guard,
    }
}

/// Installs the `color-eyre` panic and error report hooks.
pub fn install_error_handler() {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error handler: {e}");
    }
}

/// Runs `f` inside a root span named after the operation.
pub fn with_root_span<T>(name: &str, operation: &str, f: impl FnOnce() -> T) -> T {
    let span = info_span!("root", app = name, op = operation);
    let _guard = span.enter();

    f()
}
