use std::path::Path;

use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LogConfig;

/// Keeps the non-blocking file writers flushing until dropped.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    pub fn init(config: &LogConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let console_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.console_level));

        let console = fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(true)
            .with_filter(console_filter);

        if !config.to_files {
            tracing_subscriber::registry().with(console).try_init()?;
            return Ok(Logger { guards: Vec::new() });
        }

        let dir = Path::new(&config.log_dir);
        std::fs::create_dir_all(dir.join("error").join("json"))?;
        std::fs::create_dir_all(dir.join("json"))?;

        let (general, general_guard) = non_blocking(rolling::daily(dir, "devnet-backend.log"));
        let (errors, error_guard) = non_blocking(rolling::daily(dir.join("error"), "devnet-backend-error.log"));
        let (general_json, json_guard) = non_blocking(rolling::daily(dir.join("json"), "devnet-backend.json"));
        let (errors_json, error_json_guard) =
            non_blocking(rolling::daily(dir.join("error").join("json"), "devnet-backend-error.json"));

        tracing_subscriber::registry()
            .with(console)
            .with(
                fmt::layer()
                    .with_writer(general)
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&config.file_level)),
            )
            .with(
                fmt::layer()
                    .with_writer(errors)
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&config.error_file_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(general_json)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&config.file_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(errors_json)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&config.error_file_level)),
            )
            .try_init()?;

        Ok(Logger { guards: vec![general_guard, error_guard, json_guard, error_json_guard] })
    }
}
