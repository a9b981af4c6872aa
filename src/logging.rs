//! Tracing subscriber setup for the agent binary

use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_PREFIX: &str = "host-proxy.log";

/// Where log records are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Interactive commands keep stdout for their result
    Stderr,
    /// Daily rolling files in this directory, created if missing
    Directory(PathBuf),
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. For file output the returned
/// guard must be kept alive until exit to flush it.
pub fn init(level: &str, output: LogOutput) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow::anyhow!("Invalid log level {level:?}: {e}"))?;

    match output {
        LogOutput::Directory(directory) => {
            std::fs::create_dir_all(&directory)?;
            let appender = tracing_appender::rolling::daily(&directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))?;
            Ok(Some(guard))
        }
        LogOutput::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))?;
            Ok(None)
        }
    }
}
