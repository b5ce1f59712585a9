//! Tracing setup with optional OpenTelemetry file export.
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer (stderr)
//!                            → tracing-opentelemetry → SDK → OTLP JSON file
//! ```
//!
//! The file export is enabled by `trace_file` in [`crate::Config`]. The file
//! rotates at 10MB and keeps three numbered backups.
//!
//! Trace level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`

mod exporter;
mod file_writer;
mod init;

pub use init::init_tracing;
