//! Logger setup.
//!
//! Logging starts before configuration is resolved, so the filter sits behind a
//! reload handle and is switched to `logger.level` once it is known.

use crate::config::LogLevel;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

pub struct LogHandle {
    reload: Option<reload::Handle<EnvFilter, Registry>>,
    pinned: bool,
}

/// Install the global subscriber.
///
/// RUST_LOG in the environment always takes precedence; `--verbose` falls back
/// to DEBUG, otherwise WARN until the configured level is applied.
pub fn init(verbose: bool) -> LogHandle {
    let from_env = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let (filter_layer, handle) = reload::Layer::new(bootstrap_filter(verbose));

    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok();

    LogHandle { reload: installed.then_some(handle), pinned: from_env || verbose }
}

impl LogHandle {
    /// Switch to the configured level. Returns whether the filter changed.
    pub fn apply(&self, level: LogLevel) -> bool {
        if self.pinned {
            tracing::debug!("Keeping command-line log filter over configured level '{}'", level);
            return false;
        }
        let Some(handle) = &self.reload else {
            return false;
        };
        match handle.reload(level_filter(level)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to apply configured log level '{}': {}", level, e);
                false
            }
        }
    }
}

fn bootstrap_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { Level::DEBUG } else { Level::WARN };
    EnvFilter::from_default_env().add_directive(fallback.into())
}

fn level_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::default().add_directive(Level::from(level).into())
}
