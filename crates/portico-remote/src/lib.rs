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

//! HTTP implementation of the bootstrap engine's remote resolver.
//!
//! Layout: `client.rs` (reqwest client construction and the resolver).

pub mod client;

pub use client::{DestinationResponse, HttpRemoteResolver, USER_AGENT};
