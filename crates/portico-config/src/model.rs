//! Typed launch configuration.
//!
//! # Design
//! - Immutable once loaded; consumers only read it.
//! - Identifiers and feature flags are kept apart so flags can be copied freely.

use serde::Serialize;
use url::Url;

/// Feature flags that short-circuit or tweak the bootstrap decision.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureFlags {
    /// Debug build: forces the attribution status to non-organic.
    pub debug: bool,
    /// Always present the built-in game.
    pub game_only: bool,
    /// Always present the fallback web destination.
    pub web_only: bool,
    /// Simulate an offline device.
    pub no_network: bool,
    /// Prefer the notification prompt whenever a destination is resolved.
    pub ask_notifications: bool,
    /// Never leave the loading state.
    pub infinity_loading: bool,
}

impl FeatureFlags {
    /// Every flag cleared, including `debug`.
    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            debug: false,
            game_only: false,
            web_only: false,
            no_network: false,
            ask_notifications: false,
            infinity_loading: false,
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            debug: cfg!(debug_assertions),
            game_only: true,
            ..Self::cleared()
        }
    }
}

/// Read-only configuration consumed by the bootstrap engine and the launch sequence.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppConfiguration {
    /// Remote endpoint that decides the web destination.
    pub server_url: Url,
    /// Store listing identifier without prefix.
    pub store_id: String,
    /// Messaging project identifier.
    pub firebase_project_id: String,
    /// Attribution SDK developer key. Never serialized.
    #[serde(skip_serializing)]
    pub attribution_dev_key: String,
    /// Host bundle identifier.
    pub bundle_id: String,
    /// Locale identifier such as `en_US`.
    pub locale: String,
    /// Platform tag.
    pub os: String,
    /// Copy for the offline screen.
    pub no_internet_message: String,
    /// Notification prompt subtitle.
    pub notification_subtitle: String,
    /// Notification prompt body.
    pub notification_description: String,
    /// Feature flags.
    pub flags: FeatureFlags,
}

impl AppConfiguration {
    /// Store identifier in the `id<digits>` form expected by the backend.
    #[must_use]
    pub fn store_id_with_prefix(&self) -> String {
        format!("id{}", self.store_id)
    }
}
