//! Fallback identifiers and copy used when no layer supplies a value.
//!
//! # Design
//! - Mirrors the values a build would bake in when no per-scheme settings are attached.
//! - Flag defaults live on `FeatureFlags::default`.

/// Remote configuration endpoint queried during bootstrap.
pub const SERVER_URL: &str = "https://laughingdropspop.com/config.php";
/// Store listing identifier (without the `id` prefix).
pub const STORE_ID: &str = "6756708872";
/// Messaging project identifier.
pub const FIREBASE_PROJECT_ID: &str = "662865312172";
/// Attribution SDK developer key.
pub const ATTRIBUTION_DEV_KEY: &str = "zjmEk65LDPa3K8s4BWnpfA";
/// Bundle identifier reported when the host does not provide one.
pub const BUNDLE_ID: &str = "unknown.bundle";
/// Platform tag sent in the bootstrap payload.
pub const OS: &str = "iOS";
/// Locale used when neither configuration nor `LANG` yields one.
pub const LOCALE: &str = "en_US";
/// Copy shown on the offline screen.
pub const NO_INTERNET_MESSAGE: &str = "Please, check your internet connection and restart";
/// Subtitle of the notification permission prompt.
pub const NOTIFICATION_SUBTITLE: &str = "Allow notifications about bonuses and promos";
/// Body of the notification permission prompt.
pub const NOTIFICATION_DESCRIPTION: &str = "Stay tuned with best offers from our casino";
