//! Logging utilities.
//!
//! The binding crates only talk to the `log` facade. This module owns the
//! one place an `env_logger` backend gets installed, for binaries and tests
//! that want output.

mod init;

pub use init::{init_logging, LoggingConfig};
