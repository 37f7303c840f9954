//! # labeval-telemetry
//!
//! Structured logging and tracing for the labeval evaluator.
//!
//! ## Features
//! - Structured logging with `tracing`
//! - Text or JSON console output filtered by `RUST_LOG`
//! - Optional OpenTelemetry span export over OTLP
//!
//! ## Usage
//!
//! ```rust
//! use labeval_telemetry::{init_telemetry, info};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     init_telemetry("labeval")?;
//!     info!("ready");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Span, debug, error, info, instrument, trace, warn};

pub use spans::*;

pub use init::{
    InitError, LogFormat, init_telemetry, init_with_format, init_with_otlp, shutdown_telemetry,
};
