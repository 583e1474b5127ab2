//! Remote resolver seam.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::payload::Payload;

/// Failures raised by a remote resolver. The engine treats every variant the same way.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The call did not finish within its budget.
    #[error("remote resolution timed out")]
    Timeout {
        /// Budget that elapsed.
        timeout: Duration,
    },
    /// The request could not be sent or the response could not be read.
    #[error("remote transport failed")]
    Transport {
        /// Endpoint that was called.
        endpoint: String,
        /// Underlying transport error.
        source: Box<dyn StdError + Send + Sync>,
    },
    /// The endpoint answered with a non-success status.
    #[error("remote responded with non-success status")]
    Status {
        /// Endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },
    /// The response body did not have the expected shape.
    #[error("remote response was invalid")]
    InvalidResponse {
        /// Endpoint that was called.
        endpoint: String,
        /// Machine-readable reason.
        reason: &'static str,
    },
}

/// Remote call that turns a payload into an optional destination.
#[async_trait]
pub trait RemoteResolver: Send + Sync {
    /// Send `payload` and return the server-decided destination, if any.
    ///
    /// Implementations must return or fail within `timeout`.
    async fn fetch_destination(
        &self,
        payload: &Payload,
        timeout: Duration,
    ) -> Result<Option<String>, ResolverError>;
}
