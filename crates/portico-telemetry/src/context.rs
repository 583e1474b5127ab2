//! Launch span helpers.
//!
//! # Design
//! - One `launch` span per process carries the launch id and build SHA.
//! - The resolved state is recorded on that span once the decision is made.

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the launch span entered for the lifetime of the process.
pub struct LaunchContextGuard {
    _guard: Entered<'static>,
}

impl LaunchContextGuard {
    /// Enter the launch span for the lifetime of the guard.
    #[must_use]
    pub fn new(launch_id: impl Into<String>) -> Self {
        let launch_id = launch_id.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "launch",
            launch_id = %launch_id,
            build_sha = %build_sha(),
            state = tracing::field::Empty
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

/// Record the resolved application state on the active span.
pub fn record_launch_state(state: &str) {
    Span::current().record("state", tracing::field::display(state));
}
