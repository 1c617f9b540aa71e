//! Shared logging utilities for consistent tracing across sources
//!
//! Every log call is tagged with the source it concerns. The source id is
//! always passed in explicitly from the surrounding run context; the only
//! global state is the tracing subscriber itself.

use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Initialize the tracing subscriber for the tracker process
///
/// `log_level` overrides the default `info` level for the tracker and
/// shared crates. Noise from dependencies stays at `warn`.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let base_level = log_level.unwrap_or("info");
    let env_filter = format!("tracker={base_level},shared={base_level}");

    fmt()
        .with_env_filter(EnvFilter::new(&env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for source-aware info logging
#[macro_export]
macro_rules! source_info {
    ($source_id:expr, $($arg:tt)*) => {
        tracing::info!(
            source = %$source_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for source-aware warning logging
#[macro_export]
macro_rules! source_warn {
    ($source_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            source = %$source_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for source-aware error logging
#[macro_export]
macro_rules! source_error {
    ($source_id:expr, $($arg:tt)*) => {
        tracing::error!(
            source = %$source_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for source-aware debug logging
#[macro_export]
macro_rules! source_debug {
    ($source_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            source = %$source_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(source_id: &crate::types::SourceId, details: &str) {
    info!(
        source = %source_id,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(source_id: &crate::types::SourceId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        source = %source_id,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(source_id: &crate::types::SourceId, message: &str) {
    info!(
        source = %source_id,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}
