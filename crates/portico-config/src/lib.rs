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

//! Launch configuration for the Portico shell.
//!
//! Layout: `model.rs` (typed configuration and feature flags), `defaults.rs`
//! (fallback identifiers and copy), `loader.rs` (file/env layering),
//! `validate.rs` (parsing helpers).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ENV_PREFIX};
pub use model::{AppConfiguration, FeatureFlags};
