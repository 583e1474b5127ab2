//! Resolved application states handed to the presentation layer.

use serde::Serialize;
use url::Url;

/// The single experience selected for this launch.
///
/// Variants are mutually exclusive and consumed once by the presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "url", rename_all = "snake_case")]
pub enum AppState {
    /// Indefinite spinner.
    Loading,
    /// Static offline message.
    NoInternet,
    /// Built-in game view.
    Game,
    /// Web view at the destination.
    Web(Url),
    /// First-launch notification prompt that navigates to the destination when dismissed.
    FirstLaunch(Url),
    /// Notification prompt gated on the destination, regardless of launch history.
    AskNotifications(Url),
}

impl AppState {
    /// Machine-friendly discriminator used in logs and renderers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::NoInternet => "no_internet",
            Self::Game => "game",
            Self::Web(_) => "web",
            Self::FirstLaunch(_) => "first_launch",
            Self::AskNotifications(_) => "ask_notifications",
        }
    }

    /// Destination carried by the state, if any.
    #[must_use]
    pub const fn destination(&self) -> Option<&Url> {
        match self {
            Self::Web(url) | Self::FirstLaunch(url) | Self::AskNotifications(url) => Some(url),
            Self::Loading | Self::NoInternet | Self::Game => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_state_tag() -> anyhow::Result<()> {
        let url = Url::parse("https://x.test/a")?;
        assert_eq!(
            serde_json::to_value(AppState::FirstLaunch(url))?,
            json!({"state": "first_launch", "url": "https://x.test/a"})
        );
        assert_eq!(
            serde_json::to_value(AppState::NoInternet)?,
            json!({"state": "no_internet"})
        );
        Ok(())
    }

    #[test]
    fn destination_only_for_url_states() -> anyhow::Result<()> {
        let url = Url::parse("https://x.test/b")?;
        assert_eq!(AppState::Web(url.clone()).destination(), Some(&url));
        assert_eq!(AppState::Game.destination(), None);
        assert_eq!(AppState::Loading.kind(), "loading");
        Ok(())
    }
}
