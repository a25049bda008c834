//! Logging setup.
//!
//! Console output stays quiet (WARN and above, DEBUG with `--verbose`)
//! while a daily-rotated file under the tool's log directory captures
//! the same stream when the directory is usable. `RUST_LOG` overrides
//! the default level.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize the global subscriber.
///
/// Returns the guard for the non-blocking file writer; hold it for the
/// life of the process so buffered log lines are flushed on exit. An
/// unusable log directory degrades to console-only logging.
pub fn init(log_dir: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let console_layer: Box<dyn Layer<_> + Send + Sync> = Box::new(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr),
    );

    let (file_layer, guard): (Option<Box<dyn Layer<_> + Send + Sync>>, Option<WorkerGuard>) =
        match log_dir {
            Some(dir) if dir.is_dir() => {
                match rolling::RollingFileAppender::builder()
                    .rotation(rolling::Rotation::DAILY)
                    .filename_prefix("cephcli")
                    .filename_suffix("log")
                    .build(dir)
                {
                    Ok(appender) => {
                        let (writer, guard) = tracing_appender::non_blocking(appender);
                        let layer = tracing_subscriber::fmt::layer()
                            .with_ansi(false)
                            .with_writer(writer);
                        (Some(Box::new(layer)), Some(guard))
                    }
                    Err(_) => (None, None),
                }
            }
            _ => (None, None),
        };

    registry.with(console_layer).with(file_layer).init();

    guard
}
