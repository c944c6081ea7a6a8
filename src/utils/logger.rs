use crate::utils::error::{GraderError, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn build_filter(level: &str, verbose: bool) -> EnvFilter {
    // RUST_LOG 優先於設定檔
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pool_grader=debug,info")
        } else {
            EnvFilter::new(format!("pool_grader={},warn", level))
        }
    })
}

/// Installs the global subscriber. With `log_file` set, events are appended
/// to that file instead of stderr.
pub fn init_cli_logger(
    level: &str,
    verbose: bool,
    log_file: Option<&str>,
    format: LogFormat,
) -> Result<()> {
    let filter = build_filter(level, verbose);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| GraderError::LoggingError {
                    message: format!("cannot open log file {}: {}", path, e),
                })?;
            let base = tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false);
            match format {
                LogFormat::Text => base.with_filter(filter).boxed(),
                LogFormat::Json => base.json().with_filter(filter).boxed(),
            }
        }
        None => {
            let base = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);
            match format {
                LogFormat::Text => base.compact().with_filter(filter).boxed(),
                LogFormat::Json => base.json().with_filter(filter).boxed(),
            }
        }
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| GraderError::LoggingError {
            message: e.to_string(),
        })
}
