//! Logging helper
//!
//! Used by tests and hosts of `hookwire` to log consistently.
//!
//! The filter is read from `RUST_LOG`, defaulting to `info`.
//! Colors may be disabled by setting `RUST_LOG_COLOR` to anything
//! other than `1`, `yes` or `true`.

// Imports
use {
	std::env,
	tracing::level_filters::LevelFilter,
	tracing_subscriber::{prelude::*, util::TryInitError},
};

/// Initializes logging.
///
/// # Panics
/// Panics if a global subscriber was already set.
pub fn init() {
	self::try_init().expect("Unable to initialize logging");
}

/// Initializes logging, if not already initialized
pub fn try_init() -> Result<(), TryInitError> {
	let log_use_color = env::var("RUST_LOG_COLOR").map_or(true, |value| {
		matches!(value.trim().to_uppercase().as_str(), "1" | "YES" | "TRUE")
	});

	let filter = tracing_subscriber::EnvFilter::builder()
		.with_default_directive(LevelFilter::INFO.into())
		.from_env_lossy();
	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(log_use_color)
		.with_test_writer()
		.with_filter(filter);

	tracing_subscriber::registry().with(layer).try_init()
}
