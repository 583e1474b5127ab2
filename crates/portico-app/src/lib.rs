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
#![allow(clippy::redundant_pub_crate)]

//! Portico launch sequence and command-line entry point.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `dependencies.rs`: explicit construction of every collaborator for one launch
//! - `launch.rs`: the launch sequence (flag, push token, engine, presenter)
//! - `presenter.rs`: fixed state-to-screen mapping and renderers
//! - `store.rs`: persisted first-launch record and device identifier
//! - `error.rs`: application error type

pub(crate) mod cli;
pub mod dependencies;
pub mod error;
pub mod launch;
pub mod presenter;
pub mod store;

pub use cli::run;
pub use dependencies::{LaunchDependencies, LaunchOptions, load_configuration};
pub use error::{AppError, AppResult};
pub use launch::{DEFAULT_PUSH_TOKEN_TIMEOUT, LaunchSequence};
pub use presenter::{ConsolePresenter, OutputFormat, Presenter, Screen, render_screen};
pub use store::{LaunchRecord, LaunchStore};
