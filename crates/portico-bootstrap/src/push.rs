//! Messaging push token delivered asynchronously by the launch sequence.
//!
//! # Design
//! - Same one-shot cell as conversion data: the token arrives once or not at all.
//! - Absence is a valid outcome and is encoded as `None`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::signal::{Signal, SignalReceiver, SignalSender, signal};

/// Source of the messaging token bounded by a caller-supplied deadline.
#[async_trait]
pub trait PushTokenSource: Send + Sync {
    /// Token if it arrived before `timeout`.
    async fn token(&self, timeout: Duration) -> Option<String>;
}

/// Producer half held by the messaging integration.
#[derive(Debug)]
pub struct PushTokenPublisher {
    sender: SignalSender<String>,
}

impl PushTokenPublisher {
    /// Publish the token. Blank tokens are treated as a failure.
    pub fn publish(&self, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            self.fail("blank push token");
            return;
        }
        if self.sender.send(token) {
            debug!("push token received");
        } else {
            warn!("ignoring repeated push token");
        }
    }

    /// Record that the token could not be obtained.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.sender.fail(reason.clone()) {
            warn!(reason = %reason, "push token unavailable");
        }
    }
}

/// Push token source fed by a `PushTokenPublisher`.
#[derive(Debug, Clone)]
pub struct ChannelPushTokenSource {
    receiver: SignalReceiver<String>,
}

#[async_trait]
impl PushTokenSource for ChannelPushTokenSource {
    async fn token(&self, timeout: Duration) -> Option<String> {
        match self.receiver.wait(timeout).await {
            Signal::Ready(token) => Some(token),
            Signal::Failed(_) | Signal::Pending => None,
        }
    }
}

/// Create a connected publisher/source pair.
#[must_use]
pub fn push_token_channel() -> (PushTokenPublisher, ChannelPushTokenSource) {
    let (sender, receiver) = signal();
    (
        PushTokenPublisher { sender },
        ChannelPushTokenSource { receiver },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn published_token_is_returned() {
        let (publisher, source) = push_token_channel();
        publisher.publish("fcm-token");
        assert_eq!(
            source.token(Duration::from_secs(1)).await.as_deref(),
            Some("fcm-token")
        );
    }

    #[tokio::test]
    async fn blank_token_reads_as_absent() {
        let (publisher, source) = push_token_channel();
        publisher.publish("   ");
        assert_eq!(source.token(Duration::from_secs(1)).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_token_times_out() {
        let (_publisher, source) = push_token_channel();
        assert_eq!(source.token(Duration::from_secs(2)).await, None);
    }
}
