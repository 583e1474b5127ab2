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

//! Launch-time decision engine for the Portico shell.
//!
//! The engine reads feature flags, gathers attribution data, asks the remote
//! endpoint for a destination, and resolves exactly one [`AppState`].
//!
//! Layout: `state.rs` (resolved states), `conversion.rs` (attribution data and its
//! fetcher), `payload.rs` (request assembly), `attribution.rs`, `push.rs`,
//! `resolver.rs` (collaborator seams), `signal.rs` (one-shot async cell),
//! `engine.rs` (`BootstrapEngine`).

pub mod attribution;
pub mod conversion;
pub mod engine;
pub mod payload;
pub mod push;
pub mod resolver;
pub mod signal;
pub mod state;

pub use attribution::{AttributionSource, StaticAttribution};
pub use conversion::{
    AttributionValue, ChannelConversionFetcher, ConversionData, ConversionDataFetcher,
    ConversionDataSink, conversion_channel,
};
pub use engine::{
    BootstrapEngine, CONVERSION_FETCH_TIMEOUT, REMOTE_RESOLVE_TIMEOUT, WEB_ONLY_FALLBACK_URL,
};
pub use payload::{
    ATTRIBUTION_KEYS, NON_ORGANIC_STATUS, ORGANIC_STATUS, Payload, TECHNICAL_KEYS,
    TechnicalFields, build_payload,
};
pub use push::{ChannelPushTokenSource, PushTokenPublisher, PushTokenSource, push_token_channel};
pub use resolver::{RemoteResolver, ResolverError};
pub use signal::{Signal, SignalReceiver, SignalSender, signal};
pub use state::AppState;
