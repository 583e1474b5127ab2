//! Request payload assembly.
//!
//! # Design
//! - Every conversion attribute passes through unless its key is technical.
//! - Technical keys are always engine-derived and written last.
//! - Attribution fields the backend expects are always present, empty when unknown.

use std::collections::BTreeMap;

use portico_config::AppConfiguration;
use serde::Serialize;

use crate::conversion::ConversionData;

/// Attribution status sent when the SDK reported none.
pub const ORGANIC_STATUS: &str = "Organic";
/// Attribution status forced in debug builds.
pub const NON_ORGANIC_STATUS: &str = "Non-organic";

/// Payload key carrying the attribution status.
pub(crate) const AF_STATUS_KEY: &str = "af_status";

/// Keys whose values always come from the engine, never from conversion data.
pub const TECHNICAL_KEYS: [&str; 7] = [
    "af_id",
    "bundle_id",
    "os",
    "store_id",
    "locale",
    "firebase_project_id",
    "push_token",
];

/// Attribution fields the backend expects on every request.
pub const ATTRIBUTION_KEYS: [&str; 27] = [
    "adset",
    "af_adset",
    "adgroup",
    "campaign_id",
    "af_status",
    "agency",
    "af_sub3",
    "af_siteid",
    "adset_id",
    "is_fb",
    "is_first_launch",
    "click_time",
    "iscache",
    "ad_id",
    "af_sub1",
    "campaign",
    "is_paid",
    "af_sub4",
    "adgroup_id",
    "is_mobile_data_terms_signed",
    "af_channel",
    "af_sub5",
    "media_source",
    "install_time",
    "af_sub2",
    "deep_link_sub1",
    "deep_link_value",
];

/// String-to-string mapping sent to the remote endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, String>);

impl Payload {
    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Engine-derived values for the technical keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicalFields {
    /// Attribution SDK device identifier (empty when unavailable).
    pub af_id: String,
    /// Host bundle identifier.
    pub bundle_id: String,
    /// Platform tag.
    pub os: String,
    /// Prefixed store identifier.
    pub store_id: String,
    /// Locale identifier.
    pub locale: String,
    /// Messaging project identifier.
    pub firebase_project_id: String,
    /// Messaging token (empty when unavailable).
    pub push_token: String,
}

impl TechnicalFields {
    /// Derive the technical values from configuration plus the two runtime identifiers.
    #[must_use]
    pub fn from_config(
        configuration: &AppConfiguration,
        af_id: Option<String>,
        push_token: Option<&str>,
    ) -> Self {
        Self {
            af_id: af_id.unwrap_or_default(),
            bundle_id: configuration.bundle_id.clone(),
            os: configuration.os.clone(),
            store_id: configuration.store_id_with_prefix(),
            locale: configuration.locale.clone(),
            firebase_project_id: configuration.firebase_project_id.clone(),
            push_token: push_token.unwrap_or_default().to_string(),
        }
    }

    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("af_id", self.af_id.as_str()),
            ("bundle_id", self.bundle_id.as_str()),
            ("os", self.os.as_str()),
            ("store_id", self.store_id.as_str()),
            ("locale", self.locale.as_str()),
            ("firebase_project_id", self.firebase_project_id.as_str()),
            ("push_token", self.push_token.as_str()),
        ]
    }
}

/// Whether `key` is reserved for engine-derived values.
#[must_use]
pub fn is_technical_key(key: &str) -> bool {
    TECHNICAL_KEYS.contains(&key)
}

/// Merge conversion data with the technical fields.
///
/// `af_status` defaults to [`ORGANIC_STATUS`] when the conversion data supplied none
/// (a null value counts as none).
#[must_use]
pub fn build_payload(conversion: &ConversionData, technical: &TechnicalFields) -> Payload {
    let mut payload = Payload::default();
    for key in ATTRIBUTION_KEYS {
        payload.set(key, String::new());
    }

    for (key, value) in conversion.iter().filter(|(key, _)| !is_technical_key(key)) {
        payload.set(key, value.to_payload_string());
    }

    let has_status = conversion
        .get(AF_STATUS_KEY)
        .is_some_and(|value| !value.is_null());
    if !has_status {
        payload.set(AF_STATUS_KEY, ORGANIC_STATUS);
    }

    for (key, value) in technical.entries() {
        payload.set(key, value);
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::AttributionValue;

    fn technical() -> TechnicalFields {
        TechnicalFields {
            af_id: "af-1".to_string(),
            bundle_id: "com.example.shell".to_string(),
            os: "iOS".to_string(),
            store_id: "id42".to_string(),
            locale: "en_US".to_string(),
            firebase_project_id: "fb-1".to_string(),
            push_token: String::new(),
        }
    }

    #[test]
    fn technical_keys_cannot_be_spoofed() {
        let mut conversion = ConversionData::new();
        for key in TECHNICAL_KEYS {
            conversion.insert(key, "spoofed");
        }
        let payload = build_payload(&conversion, &technical());
        for (key, value) in technical().entries() {
            assert_eq!(payload.get(key), Some(value), "key {key}");
        }
    }

    #[test]
    fn supplied_status_is_kept() {
        let conversion: ConversionData = [("af_status", "Non-organic")].into_iter().collect();
        let payload = build_payload(&conversion, &technical());
        assert_eq!(payload.get("af_status"), Some(NON_ORGANIC_STATUS));
    }

    #[test]
    fn null_status_falls_back_to_organic() {
        let mut conversion = ConversionData::new();
        conversion.insert("af_status", AttributionValue::Null);
        let payload = build_payload(&conversion, &technical());
        assert_eq!(payload.get("af_status"), Some(ORGANIC_STATUS));
    }

    #[test]
    fn known_fields_present_and_unknown_fields_pass_through() {
        let mut conversion = ConversionData::new();
        conversion.insert("custom_partner_field", 7_i64);
        conversion.insert("is_first_launch", true);
        let payload = build_payload(&conversion, &technical());

        assert_eq!(payload.get("custom_partner_field"), Some("7"));
        assert_eq!(payload.get("is_first_launch"), Some("true"));
        assert_eq!(payload.get("deep_link_value"), Some(""));
        assert_eq!(
            payload.len(),
            ATTRIBUTION_KEYS.len() + TECHNICAL_KEYS.len() + 1
        );
    }

    #[test]
    fn missing_identifiers_become_empty_strings() -> anyhow::Result<()> {
        let configuration = portico_config::ConfigLoader::new().load()?;
        let fields = TechnicalFields::from_config(&configuration, None, None);
        assert_eq!(fields.af_id, "");
        assert_eq!(fields.push_token, "");
        assert_eq!(fields.store_id, "id6756708872");
        Ok(())
    }
}
