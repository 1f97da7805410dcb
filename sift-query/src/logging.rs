//! Logging setup for sift.
//!
//! The crate emits `tracing` events from the engines and the SQL builder.
//! Install a subscriber with [`init`] (feature `tracing-subscriber`) or
//! bring your own.
//!
//! # Environment Variables
//!
//! - `SIFT_DEBUG=true|1|yes` - Enable debug logging
//! - `SIFT_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `SIFT_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! sift_query::logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Whether `SIFT_DEBUG` is set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SIFT_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The level from `SIFT_LOG_LEVEL`.
///
/// Falls back to "debug" when `SIFT_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("SIFT_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// The format from `SIFT_LOG_FORMAT`. Defaults to "json".
pub fn get_log_format() -> &'static str {
    env::var("SIFT_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install the global subscriber once.
///
/// Does nothing unless `SIFT_DEBUG` or `SIFT_LOG_LEVEL` is set, or when the
/// `tracing-subscriber` feature is disabled. Later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("SIFT_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("sift={},sift_query={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            // try_init: another subscriber may already be installed.
            let installed = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level = level, format = get_log_format(), "sift logging initialized");
            }
        }
    });
}

/// Set `SIFT_LOG_LEVEL` and initialize.
///
/// # Safety
///
/// Modifies the process environment. Call at startup, before spawning
/// threads.
pub fn init_with_level(level: &str) {
    // SAFETY: documented as startup-only.
    unsafe {
        env::set_var("SIFT_LOG_LEVEL", level);
    }
    init();
}

/// Debug-level logging only when `SIFT_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! sift_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Trace-level logging only when `SIFT_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! sift_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}
