//! Layered configuration loading.
//!
//! # Design
//! - Precedence: built-in defaults, then an optional YAML document, then `PORTICO_*` variables.
//! - Environment access goes through an injected lookup so tests never mutate process state.
//! - Validation happens once, in `load`, after every layer has been applied.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{AppConfiguration, FeatureFlags};
use crate::validate::{ensure_non_empty, locale_from_lang, parse_flag, parse_server_url};

/// Prefix shared by every configuration environment variable.
pub const ENV_PREFIX: &str = "PORTICO_";

/// Partial configuration contributed by a single layer.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigLayer {
    server_url: Option<String>,
    store_id: Option<String>,
    firebase_project_id: Option<String>,
    attribution_dev_key: Option<String>,
    bundle_id: Option<String>,
    locale: Option<String>,
    os: Option<String>,
    no_internet_message: Option<String>,
    notification_subtitle: Option<String>,
    notification_description: Option<String>,
    flags: FlagLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FlagLayer {
    debug: Option<bool>,
    game_only: Option<bool>,
    web_only: Option<bool>,
    no_network: Option<bool>,
    ask_notifications: Option<bool>,
    infinity_loading: Option<bool>,
}

/// Unvalidated configuration accumulated across layers.
#[derive(Debug, Clone)]
struct Draft {
    server_url: String,
    store_id: String,
    firebase_project_id: String,
    attribution_dev_key: String,
    bundle_id: String,
    locale: String,
    os: String,
    no_internet_message: String,
    notification_subtitle: String,
    notification_description: String,
    flags: FeatureFlags,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            server_url: defaults::SERVER_URL.to_string(),
            store_id: defaults::STORE_ID.to_string(),
            firebase_project_id: defaults::FIREBASE_PROJECT_ID.to_string(),
            attribution_dev_key: defaults::ATTRIBUTION_DEV_KEY.to_string(),
            bundle_id: defaults::BUNDLE_ID.to_string(),
            locale: defaults::LOCALE.to_string(),
            os: defaults::OS.to_string(),
            no_internet_message: defaults::NO_INTERNET_MESSAGE.to_string(),
            notification_subtitle: defaults::NOTIFICATION_SUBTITLE.to_string(),
            notification_description: defaults::NOTIFICATION_DESCRIPTION.to_string(),
            flags: FeatureFlags::default(),
        }
    }
}

impl Draft {
    fn apply(&mut self, layer: ConfigLayer) {
        let ConfigLayer {
            server_url,
            store_id,
            firebase_project_id,
            attribution_dev_key,
            bundle_id,
            locale,
            os,
            no_internet_message,
            notification_subtitle,
            notification_description,
            flags,
        } = layer;

        overwrite(&mut self.server_url, server_url);
        overwrite(&mut self.store_id, store_id);
        overwrite(&mut self.firebase_project_id, firebase_project_id);
        overwrite(&mut self.attribution_dev_key, attribution_dev_key);
        overwrite(&mut self.bundle_id, bundle_id);
        overwrite(&mut self.locale, locale);
        overwrite(&mut self.os, os);
        overwrite(&mut self.no_internet_message, no_internet_message);
        overwrite(&mut self.notification_subtitle, notification_subtitle);
        overwrite(&mut self.notification_description, notification_description);

        overwrite(&mut self.flags.debug, flags.debug);
        overwrite(&mut self.flags.game_only, flags.game_only);
        overwrite(&mut self.flags.web_only, flags.web_only);
        overwrite(&mut self.flags.no_network, flags.no_network);
        overwrite(&mut self.flags.ask_notifications, flags.ask_notifications);
        overwrite(&mut self.flags.infinity_loading, flags.infinity_loading);
    }
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Builder that layers configuration sources before validating them.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    draft: Draft,
}

impl ConfigLoader {
    /// Start from the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer a YAML document read from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or does not match the expected shape.
    pub fn with_file(self, path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            operation: "config.read_file",
            path: path.to_path_buf(),
            source,
        })?;
        let layer = parse_layer(&document).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        debug!(path = %path.display(), "applied configuration file layer");
        Ok(self.with_layer(layer))
    }

    /// Layer an in-memory YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error when the document does not match the expected shape.
    pub fn with_yaml(self, document: &str) -> ConfigResult<Self> {
        let layer =
            parse_layer(document).map_err(|source| ConfigError::Parse { path: None, source })?;
        Ok(self.with_layer(layer))
    }

    /// Layer `PORTICO_*` values resolved through `lookup`.
    ///
    /// When `PORTICO_LOCALE` is absent the locale falls back to `LANG`.
    ///
    /// # Errors
    ///
    /// Returns an error when a flag variable is not a recognised boolean.
    pub fn with_env<F>(self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));
        let flag = |field: &'static str, suffix: &str| -> ConfigResult<Option<bool>> {
            var(suffix).map(|raw| parse_flag(field, &raw)).transpose()
        };

        let layer = ConfigLayer {
            server_url: var("SERVER_URL"),
            store_id: var("STORE_ID"),
            firebase_project_id: var("FIREBASE_PROJECT_ID"),
            attribution_dev_key: var("ATTRIBUTION_DEV_KEY"),
            bundle_id: var("BUNDLE_ID"),
            locale: var("LOCALE").or_else(|| lookup("LANG").and_then(|lang| locale_from_lang(&lang))),
            os: var("OS"),
            no_internet_message: var("NO_INTERNET_MESSAGE"),
            notification_subtitle: var("NOTIFICATION_SUBTITLE"),
            notification_description: var("NOTIFICATION_DESCRIPTION"),
            flags: FlagLayer {
                debug: flag("debug", "DEBUG")?,
                game_only: flag("game_only", "GAME_ONLY")?,
                web_only: flag("web_only", "WEB_ONLY")?,
                no_network: flag("no_network", "NO_NETWORK")?,
                ask_notifications: flag("ask_notifications", "ASK_NOTIFICATIONS")?,
                infinity_loading: flag("infinity_loading", "INFINITY_LOADING")?,
            },
        };
        Ok(self.with_layer(layer))
    }

    /// Layer the current process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a flag variable is not a recognised boolean.
    pub fn with_process_env(self) -> ConfigResult<Self> {
        self.with_env(|name| std::env::var(name).ok())
    }

    /// Override the feature flags wholesale.
    #[must_use]
    pub const fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.draft.flags = flags;
        self
    }

    fn with_layer(mut self, layer: ConfigLayer) -> Self {
        self.draft.apply(layer);
        self
    }

    /// Validate the accumulated layers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidField` when the server URL is malformed or a
    /// required identifier is blank.
    pub fn load(self) -> ConfigResult<AppConfiguration> {
        let Draft {
            server_url,
            store_id,
            firebase_project_id,
            attribution_dev_key,
            bundle_id,
            locale,
            os,
            no_internet_message,
            notification_subtitle,
            notification_description,
            flags,
        } = self.draft;

        let server_url = parse_server_url(&server_url)?;
        ensure_non_empty("store_id", &store_id)?;
        ensure_non_empty("bundle_id", &bundle_id)?;

        Ok(AppConfiguration {
            server_url,
            store_id: store_id.trim().to_string(),
            firebase_project_id,
            attribution_dev_key,
            bundle_id: bundle_id.trim().to_string(),
            locale,
            os,
            no_internet_message,
            notification_subtitle,
            notification_description,
            flags,
        })
    }
}

fn parse_layer(document: &str) -> Result<ConfigLayer, serde_yaml::Error> {
    if document.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    serde_yaml::from_str(document)
}
