//! Attribution (conversion) data and the fetcher that waits for it.
//!
//! # Design
//! - The attribution SDK callback fires at most once per session, possibly never.
//! - `ConversionDataSink` is handed to whatever owns that callback; the engine only
//!   sees `ConversionDataFetcher`, which always returns by the caller's deadline.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::signal::{Signal, SignalReceiver, SignalSender, signal};

/// Scalar value reported by the attribution SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributionValue {
    /// Explicit null.
    Null,
    /// Boolean flag such as `is_first_launch`.
    Bool(bool),
    /// Integral value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Free-form text.
    Text(String),
}

impl AttributionValue {
    /// Text form placed into the request payload; `Null` renders as an empty string.
    #[must_use]
    pub fn to_payload_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }

    /// Whether the value carries no information.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for AttributionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for AttributionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Attribution attributes keyed by name. Keys are open-ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionData(BTreeMap<String, AttributionValue>);

impl ConversionData {
    /// Empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributionValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributionValue> {
        self.0.get(key)
    }

    /// Whether no attributes arrived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributionValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for ConversionData
where
    K: Into<String>,
    V: Into<AttributionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Source of conversion data bounded by a caller-supplied deadline.
#[async_trait]
pub trait ConversionDataFetcher: Send + Sync {
    /// Return whatever arrived by `timeout`; an empty mapping when nothing did. Never fails.
    async fn fetch(&self, timeout: Duration) -> ConversionData;
}

/// Receiving end of the attribution SDK callback.
#[derive(Debug)]
pub struct ConversionDataSink {
    sender: SignalSender<ConversionData>,
}

impl ConversionDataSink {
    /// Deliver the conversion payload. Only the first delivery is kept.
    pub fn deliver(&self, data: ConversionData) {
        let keys = data.len();
        if self.sender.send(data) {
            info!(keys, "conversion data received");
        } else {
            warn!(keys, "ignoring repeated conversion data delivery");
        }
    }

    /// Record that the SDK reported a failure; waiting fetchers return empty data immediately.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.sender.fail(reason.clone()) {
            warn!(reason = %reason, "conversion data request failed");
        } else {
            debug!(reason = %reason, "ignoring conversion failure after settlement");
        }
    }
}

/// Fetcher backed by the one-shot cell a `ConversionDataSink` fills.
#[derive(Debug, Clone)]
pub struct ChannelConversionFetcher {
    receiver: SignalReceiver<ConversionData>,
}

#[async_trait]
impl ConversionDataFetcher for ChannelConversionFetcher {
    async fn fetch(&self, timeout: Duration) -> ConversionData {
        match self.receiver.wait(timeout).await {
            Signal::Ready(data) => data,
            Signal::Failed(_) => ConversionData::new(),
            Signal::Pending => {
                debug!(
                    timeout_ms = timeout.as_millis(),
                    "conversion data not received before deadline"
                );
                ConversionData::new()
            }
        }
    }
}

/// Create a connected sink/fetcher pair.
#[must_use]
pub fn conversion_channel() -> (ConversionDataSink, ChannelConversionFetcher) {
    let (sender, receiver) = signal();
    (
        ConversionDataSink { sender },
        ChannelConversionFetcher { receiver },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_mixed_scalar_values() -> anyhow::Result<()> {
        let data: ConversionData = serde_json::from_value(json!({
            "af_status": "Non-organic",
            "is_first_launch": true,
            "click_time": 1_700_000_000,
            "cost": 0.25,
            "agency": null,
        }))?;
        assert_eq!(data.len(), 5);
        assert_eq!(data.get("af_status"), Some(&AttributionValue::from("Non-organic")));
        assert_eq!(data.get("is_first_launch"), Some(&AttributionValue::Bool(true)));
        assert_eq!(
            data.get("click_time"),
            Some(&AttributionValue::Integer(1_700_000_000))
        );
        assert_eq!(data.get("cost"), Some(&AttributionValue::Float(0.25)));
        assert!(data.get("agency").is_some_and(AttributionValue::is_null));
        Ok(())
    }

    #[test]
    fn payload_strings_render_scalars() {
        assert_eq!(AttributionValue::Null.to_payload_string(), "");
        assert_eq!(AttributionValue::Bool(false).to_payload_string(), "false");
        assert_eq!(AttributionValue::Integer(-4).to_payload_string(), "-4");
        assert_eq!(AttributionValue::Float(1.5).to_payload_string(), "1.5");
        assert_eq!(AttributionValue::from("x").to_payload_string(), "x");
    }

    #[tokio::test]
    async fn fetch_returns_delivered_data() {
        let (sink, fetcher) = conversion_channel();
        sink.deliver([("campaign_id", "X")].into_iter().collect());
        let data = fetcher.fetch(Duration::from_secs(3)).await;
        assert_eq!(data.get("campaign_id"), Some(&AttributionValue::from("X")));
    }

    #[tokio::test]
    async fn repeated_delivery_keeps_first_payload() {
        let (sink, fetcher) = conversion_channel();
        sink.deliver([("campaign_id", "first")].into_iter().collect());
        sink.deliver([("campaign_id", "second")].into_iter().collect());
        let data = fetcher.fetch(Duration::from_secs(3)).await;
        assert_eq!(data.get("campaign_id"), Some(&AttributionValue::from("first")));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_short_circuits_the_wait() {
        let (sink, fetcher) = conversion_channel();
        sink.fail("sdk error");
        let started = tokio::time::Instant::now();
        let data = fetcher.fetch(Duration::from_secs(3)).await;
        assert!(data.is_empty());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn silence_yields_empty_data_at_deadline() {
        let (_sink, fetcher) = conversion_channel();
        let started = tokio::time::Instant::now();
        let data = fetcher.fetch(Duration::from_secs(3)).await;
        assert!(data.is_empty());
        assert!(started.elapsed() >= Duration::from_secs(3));
    }
}
