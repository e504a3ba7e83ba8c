//! File logging setup.
//!
//! Logs go to `$RXDESK_HOME/logs/rxdesk.log` so stdout stays clean for
//! command output. `RXDESK_LOG` overrides the configured filter.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "RXDESK_LOG";

/// Installs the global subscriber.
///
/// Returns the writer guard; dropping it flushes pending lines. Returns
/// `None` if a subscriber was already installed, the filter is invalid, or
/// the log directory cannot be created; logging is then off.
pub fn init(config: &Config) -> Option<WorkerGuard> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(directive.trim()),
        _ => EnvFilter::try_new(&config.log.filter),
    }
    .ok()?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("rxdesk.log")
        .build(paths::logs_dir())
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
