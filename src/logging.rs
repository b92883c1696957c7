//! Logging setup and event macros.
//!
//! Compact timestamped output on stderr with per-target level configuration.
//! `RUST_LOG` overrides the configured levels.
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! default = "info"
//!
//! [logging.modules]
//! "headwatch::watcher" = "debug"
//! ```
//!
//! # Environment Variable
//!
//! ```bash
//! RUST_LOG=debug headwatch
//! RUST_LOG=headwatch::header=trace headwatch sync
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Build the filter directive string from configuration.
fn filter_directives(config: &LoggingConfig) -> String {
    let mut directives = config.default.clone();
    let mut modules: Vec<_> = config.modules.iter().collect();
    modules.sort();
    for (module, level) in modules {
        directives.push_str(&format!(",{module}={level}"));
    }
    directives
}

/// Initialize logging with configuration.
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_timer(CompactTime)
            .with_level(true)
            .with_writer(std::io::stderr)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Log an event with component context.
///
/// # Examples
/// ```ignore
/// log_event!("header", "updated", "{}", rel);
/// log_event!("watcher", "started");
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:expr, $event:expr) => {
        tracing::info!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

/// Debug-only event logging.
///
/// # Examples
/// ```ignore
/// debug_event!("watcher", "ignored", "{}", path.display());
/// ```
#[macro_export]
macro_rules! debug_event {
    ($component:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        let mut config = LoggingConfig::default();
        assert_eq!(filter_directives(&config), "info");

        config.default = "warn".to_string();
        config
            .modules
            .insert("headwatch::watcher".to_string(), "debug".to_string());
        config
            .modules
            .insert("headwatch::header".to_string(), "trace".to_string());
        assert_eq!(
            filter_directives(&config),
            "warn,headwatch::header=trace,headwatch::watcher=debug"
        );
    }
}
