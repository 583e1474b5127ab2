#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives shared across the Portico workspace.
//!
//! Layout: `init.rs` (subscriber installation), `context.rs` (launch span),
//! `log_store.rs` (bounded, persistable log buffer), `error.rs`.

pub mod context;
pub mod error;
pub mod init;
pub mod log_store;

pub use context::{LaunchContextGuard, record_launch_state};
pub use error::{Result, TelemetryError};
pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging, init_logging_with_store,
};
pub use log_store::{LOG_FILE_NAME, LOG_STORE_CAPACITY, LogStore};
