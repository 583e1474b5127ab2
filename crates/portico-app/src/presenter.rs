//! Mapping from resolved states to what the user sees.
//!
//! # Design
//! - The state-to-screen mapping is fixed and lives in `Screen::for_state`.
//! - Rendering is a pure function so output can be asserted without a terminal.
//! - `Presenter` is the seam a real UI shell would implement.

use clap::ValueEnum;
use portico_bootstrap::AppState;
use portico_config::AppConfiguration;
use serde::Serialize;
use url::Url;

use crate::error::{AppError, AppResult};

/// Output encoding for rendered screens and configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Screen shown for a resolved state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    /// Loading spinner with no exit.
    Spinner,
    /// Connectivity notice.
    Offline {
        /// Message shown to the user.
        message: String,
    },
    /// Native game content.
    Game,
    /// Full-screen web view.
    Web {
        /// Page to load.
        url: Url,
    },
    /// Notification permission prompt that leads to a web view.
    NotificationPrompt {
        /// Page to load once the prompt is dismissed.
        url: Url,
        /// Whether this is the first completed launch.
        first_launch: bool,
        /// Prompt subtitle.
        subtitle: String,
        /// Prompt body.
        description: String,
    },
}

impl Screen {
    /// Screen for `state`, using copy strings from `config`.
    #[must_use]
    pub fn for_state(state: &AppState, config: &AppConfiguration) -> Self {
        match state {
            AppState::Loading => Self::Spinner,
            AppState::NoInternet => Self::Offline {
                message: config.no_internet_message.clone(),
            },
            AppState::Game => Self::Game,
            AppState::Web(url) => Self::Web { url: url.clone() },
            AppState::FirstLaunch(url) => Self::NotificationPrompt {
                url: url.clone(),
                first_launch: true,
                subtitle: config.notification_subtitle.clone(),
                description: config.notification_description.clone(),
            },
            AppState::AskNotifications(url) => Self::NotificationPrompt {
                url: url.clone(),
                first_launch: false,
                subtitle: config.notification_subtitle.clone(),
                description: config.notification_description.clone(),
            },
        }
    }
}

/// Render `screen` in the requested format.
///
/// # Errors
///
/// Returns an error when JSON encoding fails.
pub fn render_screen(screen: &Screen, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(screen).map_err(|source| AppError::Render { source })
        }
        OutputFormat::Text => Ok(match screen {
            Screen::Spinner => "screen: spinner".to_string(),
            Screen::Offline { message } => format!("screen: offline\nmessage: {message}"),
            Screen::Game => "screen: game".to_string(),
            Screen::Web { url } => format!("screen: web\nurl: {url}"),
            Screen::NotificationPrompt {
                url,
                first_launch,
                subtitle,
                description,
            } => format!(
                "screen: notification_prompt\nurl: {url}\nfirst launch: {first_launch}\n\
                 subtitle: {subtitle}\ndescription: {description}"
            ),
        }),
    }
}

/// Displays screens to the user.
pub trait Presenter: Send + Sync {
    /// Show `screen`.
    ///
    /// # Errors
    ///
    /// Returns an error when the screen cannot be rendered.
    fn present(&self, screen: &Screen) -> AppResult<()>;
}

/// Presenter that prints rendered screens to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePresenter {
    format: OutputFormat,
}

impl ConsolePresenter {
    /// Presenter using `format`.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl Presenter for ConsolePresenter {
    fn present(&self, screen: &Screen) -> AppResult<()> {
        let text = render_screen(screen, self.format)?;
        println!("{text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_config::ConfigLoader;

    fn config() -> anyhow::Result<AppConfiguration> {
        Ok(ConfigLoader::new().load()?)
    }

    fn url(raw: &str) -> anyhow::Result<Url> {
        Ok(Url::parse(raw)?)
    }

    #[test]
    fn states_map_to_fixed_screens() -> anyhow::Result<()> {
        let config = config()?;
        assert_eq!(Screen::for_state(&AppState::Loading, &config), Screen::Spinner);
        assert_eq!(Screen::for_state(&AppState::Game, &config), Screen::Game);
        assert_eq!(
            Screen::for_state(&AppState::NoInternet, &config),
            Screen::Offline {
                message: config.no_internet_message.clone()
            }
        );
        let target = url("https://promo.example/landing")?;
        assert_eq!(
            Screen::for_state(&AppState::Web(target.clone()), &config),
            Screen::Web {
                url: target.clone()
            }
        );
        Ok(())
    }

    #[test]
    fn notification_states_differ_only_in_first_launch() -> anyhow::Result<()> {
        let config = config()?;
        let target = url("https://promo.example/landing")?;
        let first = Screen::for_state(&AppState::FirstLaunch(target.clone()), &config);
        let ask = Screen::for_state(&AppState::AskNotifications(target.clone()), &config);
        match (first, ask) {
            (
                Screen::NotificationPrompt {
                    first_launch: true,
                    url: first_url,
                    subtitle,
                    ..
                },
                Screen::NotificationPrompt {
                    first_launch: false,
                    url: ask_url,
                    ..
                },
            ) => {
                assert_eq!(first_url, target);
                assert_eq!(ask_url, target);
                assert_eq!(subtitle, config.notification_subtitle);
            }
            other => panic!("unexpected screens: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn json_rendering_is_tagged_by_screen() -> anyhow::Result<()> {
        let rendered = render_screen(
            &Screen::Web {
                url: url("https://promo.example/")?,
            },
            OutputFormat::Json,
        )?;
        let value: serde_json::Value = serde_json::from_str(&rendered)?;
        assert_eq!(value["screen"], "web");
        assert_eq!(value["url"], "https://promo.example/");
        Ok(())
    }

    #[test]
    fn text_rendering_names_the_screen() -> anyhow::Result<()> {
        assert_eq!(render_screen(&Screen::Game, OutputFormat::Text)?, "screen: game");
        let offline = render_screen(
            &Screen::Offline {
                message: "check your connection".into(),
            },
            OutputFormat::Text,
        )?;
        assert!(offline.contains("message: check your connection"));
        Ok(())
    }
}
