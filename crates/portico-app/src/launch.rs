//! # Design
//!
//! - One launch runs a fixed order: read the launch flag, wait for the push token,
//!   resolve, present, then record the launch.
//! - The launch is recorded after any resolved state so the next run is never "first".
//! - Every collaborator is injected; nothing is looked up globally.

use std::sync::Arc;
use std::time::Duration;

use portico_bootstrap::{AppState, BootstrapEngine, PushTokenSource};
use portico_telemetry::record_launch_state;
use tracing::{info, instrument};

use crate::error::AppResult;
use crate::presenter::{Presenter, Screen};
use crate::store::LaunchStore;

/// How long the launch waits for the messaging token before resolving without it.
pub const DEFAULT_PUSH_TOKEN_TIMEOUT: Duration = Duration::from_secs(2);

/// Orchestrates a single application launch.
pub struct LaunchSequence {
    engine: BootstrapEngine,
    push_tokens: Arc<dyn PushTokenSource>,
    store: LaunchStore,
    presenter: Arc<dyn Presenter>,
    push_token_timeout: Duration,
}

impl LaunchSequence {
    /// Build a launch sequence from its collaborators.
    #[must_use]
    pub fn new(
        engine: BootstrapEngine,
        push_tokens: Arc<dyn PushTokenSource>,
        store: LaunchStore,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            engine,
            push_tokens,
            store,
            presenter,
            push_token_timeout: DEFAULT_PUSH_TOKEN_TIMEOUT,
        }
    }

    /// Override the push token wait.
    #[must_use]
    pub const fn with_push_token_timeout(mut self, timeout: Duration) -> Self {
        self.push_token_timeout = timeout;
        self
    }

    /// Run the launch and return the state that was presented.
    ///
    /// # Errors
    ///
    /// Returns an error when the launch record cannot be read or written, or the
    /// screen cannot be presented.
    #[instrument(name = "launch.run", skip(self), fields(state = tracing::field::Empty))]
    pub async fn run(&self) -> AppResult<AppState> {
        let has_launched_before = self.store.has_launched_before().await?;
        let push_token = self.push_tokens.token(self.push_token_timeout).await;
        info!(
            has_launched_before,
            push_token_present = push_token.is_some(),
            "launch inputs gathered"
        );

        let state = self
            .engine
            .resolve(push_token.as_deref(), has_launched_before)
            .await;
        record_launch_state(state.kind());

        let screen = Screen::for_state(&state, self.engine.configuration());
        self.presenter.present(&screen)?;

        if !has_launched_before {
            self.store.mark_launched().await?;
        }
        Ok(state)
    }
}
