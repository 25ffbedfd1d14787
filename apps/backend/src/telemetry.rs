//! Process-wide `tracing` subscriber.

use std::str::FromStr;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::AppError;

/// Filter used when `RUST_LOG` is unset. Keeps actix's per-worker startup
/// lines out of the default output.
pub const DEFAULT_LOG_FILTER: &str = "info,actix_server=warn";

/// Shape of the process log lines, from `BACKEND_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Single-line human-readable output for local runs.
    Compact,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "compact" | "pretty" => Ok(Self::Compact),
            _ => Err(AppError::config(format!(
                "BACKEND_LOG_FORMAT must be 'json' or 'compact', got '{raw}'"
            ))),
        }
    }
}

/// Install the global subscriber; `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`].
pub fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_ansi(false)
                    .json(),
            )
            .init(),
        LogFormat::Compact => registry
            .with(fmt::layer().with_target(false).compact())
            .init(),
    }
}
