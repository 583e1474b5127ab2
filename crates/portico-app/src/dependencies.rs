//! # Design
//!
//! - Build every collaborator for one launch explicitly from configuration and options.
//! - The conversion-data file stands in for the attribution SDK callback and is fed
//!   on a spawned task so the engine observes it asynchronously.
//! - Without a file the sink stays open and never fires, matching a silent SDK.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use portico_bootstrap::{
    AppState, BootstrapEngine, ConversionData, ConversionDataSink, StaticAttribution,
    conversion_channel, push_token_channel,
};
use portico_config::{AppConfiguration, ConfigLoader};
use portico_remote::HttpRemoteResolver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::launch::{DEFAULT_PUSH_TOKEN_TIMEOUT, LaunchSequence};
use crate::presenter::Presenter;
use crate::store::LaunchStore;

/// Inputs for a single launch beyond the configuration itself.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Directory holding launch state and logs.
    pub state_dir: PathBuf,
    /// Messaging token to publish, if any.
    pub push_token: Option<String>,
    /// How long to wait for the push token.
    pub push_token_timeout: Duration,
    /// JSON file delivered as conversion data.
    pub conversion_data: Option<PathBuf>,
    /// Delay before the conversion data is delivered.
    pub conversion_delay: Duration,
    /// Attribution identifier overriding the persisted device id.
    pub attribution_id: Option<String>,
}

impl LaunchOptions {
    /// Options rooted at `state_dir` with no token, no conversion data, and default waits.
    #[must_use]
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            push_token: None,
            push_token_timeout: DEFAULT_PUSH_TOKEN_TIMEOUT,
            conversion_data: None,
            conversion_delay: Duration::ZERO,
            attribution_id: None,
        }
    }
}

/// Load configuration from defaults, an optional YAML file, and the process environment.
///
/// # Errors
///
/// Returns an error when any layer is unreadable or the result fails validation.
pub fn load_configuration(config_path: Option<&Path>) -> AppResult<AppConfiguration> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader
            .with_file(path)
            .map_err(|err| AppError::config("config.file", err))?;
    }
    loader
        .with_process_env()
        .map_err(|err| AppError::config("config.env", err))?
        .load()
        .map_err(|err| AppError::config("config.load", err))
}

/// Fully wired launch plus the task feeding conversion data into it.
pub struct LaunchDependencies {
    sequence: LaunchSequence,
    conversion_feed: JoinHandle<()>,
}

impl LaunchDependencies {
    /// Wire the engine, remote resolver, token source, and store for one launch.
    ///
    /// # Errors
    ///
    /// Returns an error when the state directory or device id cannot be prepared, or
    /// the HTTP client cannot be built.
    pub async fn build(
        config: AppConfiguration,
        options: &LaunchOptions,
        presenter: Arc<dyn Presenter>,
    ) -> AppResult<Self> {
        let store = LaunchStore::new(&options.state_dir);
        store.ensure_dir().await?;

        let attribution_id = match options.attribution_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => store.device_id().await?,
        };

        let resolver = HttpRemoteResolver::new(config.server_url.clone()).map_err(|source| {
            AppError::Resolver {
                operation: "remote.build",
                source,
            }
        })?;

        let (sink, fetcher) = conversion_channel();
        let conversion_feed = tokio::spawn(feed_conversion_data(
            sink,
            options.conversion_data.clone(),
            options.conversion_delay,
        ));

        let (publisher, push_tokens) = push_token_channel();
        match &options.push_token {
            Some(token) => publisher.publish(token.clone()),
            None => publisher.fail("no push token supplied"),
        }

        let engine = BootstrapEngine::new(
            Arc::new(config),
            Arc::new(fetcher),
            Arc::new(StaticAttribution::new(Some(attribution_id))),
            Arc::new(resolver),
        );
        let sequence = LaunchSequence::new(engine, Arc::new(push_tokens), store, presenter)
            .with_push_token_timeout(options.push_token_timeout);

        Ok(Self {
            sequence,
            conversion_feed,
        })
    }

    /// Run the launch and stop the conversion feed afterwards.
    ///
    /// # Errors
    ///
    /// Propagates failures from the launch sequence.
    pub async fn run(self) -> AppResult<AppState> {
        let result = self.sequence.run().await;
        self.conversion_feed.abort();
        result
    }
}

async fn feed_conversion_data(sink: ConversionDataSink, path: Option<PathBuf>, delay: Duration) {
    let Some(path) = path else {
        debug!("no conversion data source configured");
        std::future::pending::<()>().await;
        return;
    };
    tokio::time::sleep(delay).await;
    match read_conversion_data(&path).await {
        Ok(data) => {
            info!(path = %path.display(), "delivering conversion data");
            sink.deliver(data);
        }
        Err(reason) => {
            warn!(path = %path.display(), reason, "conversion data unavailable");
            sink.fail(reason);
        }
    }
}

async fn read_conversion_data(path: &Path) -> Result<ConversionData, &'static str> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|_| "conversion_file_unreadable")?;
    serde_json::from_slice(&raw).map_err(|_| "conversion_file_not_json_object")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn conversion_file_is_delivered_through_the_channel() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("conversion.json");
        std::fs::write(&path, r#"{"af_status":"Non-organic","campaign":"spring"}"#)?;

        let (sink, fetcher) = conversion_channel();
        feed_conversion_data(sink, Some(path), Duration::ZERO).await;

        let data =
            portico_bootstrap::ConversionDataFetcher::fetch(&fetcher, Duration::from_millis(50))
                .await;
        assert_eq!(data.len(), 2);
        assert_eq!(
            data.get("campaign").map(portico_bootstrap::AttributionValue::to_payload_string),
            Some("spring".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn malformed_conversion_file_fails_the_channel() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("conversion.json");
        std::fs::write(&path, "[1, 2, 3]")?;

        let (sink, fetcher) = conversion_channel();
        feed_conversion_data(sink, Some(path), Duration::ZERO).await;

        let data =
            portico_bootstrap::ConversionDataFetcher::fetch(&fetcher, Duration::from_secs(5)).await;
        assert!(data.is_empty());
        Ok(())
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let err = load_configuration(Some(Path::new("/nonexistent/portico.yaml")));
        assert!(matches!(err, Err(AppError::Config { .. })));
    }
}
