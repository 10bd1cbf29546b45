//! # Sync Telemetry
//!
//! Structured logging for the authority and satellite processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sync_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::for_role("wearable")).ok();
//!     // tracing macros now reach the console
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MS_SERVICE_NAME` | `maintsync` | Service name in log lines |
//! | `MS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `MS_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `MS_JSON_LOGS` | `false` | JSON lines instead of pretty output |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The log level is not a valid filter directive.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("Telemetry already initialised")]
    AlreadyInitialised,
}

/// Install the global log subscriber.
///
/// A second call returns `TelemetryError::AlreadyInitialised` rather than
/// panicking, so tests and embedding hosts can call it freely.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)
}

/// Convenience macro for creating a span with subsystem context.
///
/// ```rust,ignore
/// let _span = sync_span!("drain", subsystem = "ms-05", pending = 3).entered();
/// ```
#[macro_export]
macro_rules! sync_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
