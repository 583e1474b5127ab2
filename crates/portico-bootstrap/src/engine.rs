//! Bootstrap decision engine.
//!
//! # Design
//! - Flag short-circuits run first, in fixed order, before any external call.
//! - Otherwise: conversion data (3s), payload assembly, remote resolution (30s).
//! - Every failure degrades to a defined state; nothing is surfaced to the caller.
//! - Collaborators are injected at construction; the engine holds no global state.

use std::sync::Arc;
use std::time::Duration;

use portico_config::{AppConfiguration, FeatureFlags};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::attribution::AttributionSource;
use crate::conversion::ConversionDataFetcher;
use crate::payload::{AF_STATUS_KEY, NON_ORGANIC_STATUS, Payload, TechnicalFields, build_payload};
use crate::resolver::RemoteResolver;
use crate::state::AppState;

/// Budget for waiting on attribution data.
pub const CONVERSION_FETCH_TIMEOUT: Duration = Duration::from_secs(3);
/// Budget for the remote resolution call.
pub const REMOTE_RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);
/// Destination used when the web-only flag is set.
pub const WEB_ONLY_FALLBACK_URL: &str = "https://example.com";

/// Resolves the launch experience from flags, attribution data, and the remote endpoint.
#[derive(Clone)]
pub struct BootstrapEngine {
    configuration: Arc<AppConfiguration>,
    conversion: Arc<dyn ConversionDataFetcher>,
    attribution: Arc<dyn AttributionSource>,
    resolver: Arc<dyn RemoteResolver>,
}

impl BootstrapEngine {
    /// Build an engine over explicitly supplied collaborators.
    #[must_use]
    pub fn new(
        configuration: Arc<AppConfiguration>,
        conversion: Arc<dyn ConversionDataFetcher>,
        attribution: Arc<dyn AttributionSource>,
        resolver: Arc<dyn RemoteResolver>,
    ) -> Self {
        Self {
            configuration,
            conversion,
            attribution,
            resolver,
        }
    }

    /// Configuration the engine reads.
    #[must_use]
    pub fn configuration(&self) -> &AppConfiguration {
        &self.configuration
    }

    /// Resolve the state for this launch. Never fails.
    #[instrument(name = "bootstrap.resolve", skip(self, push_token))]
    pub async fn resolve(&self, push_token: Option<&str>, has_launched_before: bool) -> AppState {
        if let Some(state) = short_circuit(self.configuration.flags) {
            info!(state = state.kind(), "resolved from feature flags");
            return state;
        }

        let payload = self.assemble_payload(push_token).await;
        let state = match self
            .resolver
            .fetch_destination(&payload, REMOTE_RESOLVE_TIMEOUT)
            .await
        {
            Ok(destination) => route_destination(
                destination.as_deref(),
                self.configuration.flags.ask_notifications,
                has_launched_before,
            ),
            Err(err) => {
                warn!(error = %err, "remote resolution failed; presenting game");
                AppState::Game
            }
        };
        info!(state = state.kind(), "resolved from remote destination");
        state
    }

    /// Gather conversion data and the attribution id, then build the request payload.
    pub async fn assemble_payload(&self, push_token: Option<&str>) -> Payload {
        let conversion = self.conversion.fetch(CONVERSION_FETCH_TIMEOUT).await;
        let technical = TechnicalFields::from_config(
            &self.configuration,
            self.attribution.attribution_id(),
            push_token,
        );
        let mut payload = build_payload(&conversion, &technical);
        if self.configuration.flags.debug {
            payload.set(AF_STATUS_KEY, NON_ORGANIC_STATUS);
        }
        debug!(
            conversion_keys = conversion.len(),
            payload_keys = payload.len(),
            has_push_token = push_token.is_some_and(|token| !token.is_empty()),
            "assembled bootstrap payload"
        );
        payload
    }
}

/// Flag checks in fixed priority order.
fn short_circuit(flags: FeatureFlags) -> Option<AppState> {
    if flags.infinity_loading {
        return Some(AppState::Loading);
    }
    if flags.no_network {
        return Some(AppState::NoInternet);
    }
    if flags.game_only {
        return Some(AppState::Game);
    }
    if flags.web_only {
        return Some(
            Url::parse(WEB_ONLY_FALLBACK_URL).map_or(AppState::Game, AppState::Web),
        );
    }
    None
}

/// Map a successful remote answer onto a state.
///
/// The notification prompt outranks the first-launch screen when both apply.
fn route_destination(
    destination: Option<&str>,
    ask_notifications: bool,
    has_launched_before: bool,
) -> AppState {
    let Some(url) = destination.and_then(parse_destination) else {
        return AppState::Game;
    };
    if ask_notifications {
        AppState::AskNotifications(url)
    } else if has_launched_before {
        AppState::Web(url)
    } else {
        AppState::FirstLaunch(url)
    }
}

fn parse_destination(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) => Some(url),
        Err(err) => {
            debug!(error = %err, "ignoring malformed destination");
            None
        }
    }
}
