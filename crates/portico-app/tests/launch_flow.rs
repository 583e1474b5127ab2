//! End-to-end launch runs against a mocked remote endpoint.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use httpmock::prelude::*;
use portico_app::{AppResult, LaunchDependencies, LaunchOptions, LaunchStore, Presenter, Screen};
use portico_bootstrap::{AppState, ConversionData, TechnicalFields, build_payload};
use portico_config::{AppConfiguration, ConfigLoader};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingPresenter {
    screens: Mutex<Vec<Screen>>,
}

impl RecordingPresenter {
    fn screens(&self) -> Vec<Screen> {
        self.screens
            .lock()
            .map(|screens| screens.clone())
            .unwrap_or_default()
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, screen: &Screen) -> AppResult<()> {
        if let Ok(mut screens) = self.screens.lock() {
            screens.push(screen.clone());
        }
        Ok(())
    }
}

fn configuration(server_url: &str, ask_notifications: bool) -> anyhow::Result<AppConfiguration> {
    let yaml = format!(
        "server_url: {server_url}\n\
         bundle_id: com.example.portico\n\
         flags:\n  \
           debug: false\n  \
           game_only: false\n  \
           web_only: false\n  \
           no_network: false\n  \
           ask_notifications: {ask_notifications}\n  \
           infinity_loading: false\n"
    );
    Ok(ConfigLoader::new().with_yaml(&yaml)?.load()?)
}

fn options(state: &TempDir, conversion: &TempDir) -> anyhow::Result<LaunchOptions> {
    let path = conversion.path().join("conversion.json");
    std::fs::write(&path, r#"{"af_status":"Non-organic","campaign":"spring"}"#)?;
    Ok(LaunchOptions {
        push_token: Some("push-token-1".into()),
        push_token_timeout: Duration::from_millis(200),
        conversion_data: Some(path),
        attribution_id: Some("attr-1".into()),
        ..LaunchOptions::new(state.path())
    })
}

#[tokio::test]
async fn first_run_prompts_then_second_run_opens_the_web_view() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/config.php");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({ "url": "https://promo.example/landing" }));
    });

    let state = TempDir::new()?;
    let conversion = TempDir::new()?;
    let options = options(&state, &conversion)?;
    let server_url = server.url("/config.php");

    let presenter = Arc::new(RecordingPresenter::default());
    let first = LaunchDependencies::build(
        configuration(&server_url, false)?,
        &options,
        presenter.clone(),
    )
    .await?
    .run()
    .await?;
    let expected = url::Url::parse("https://promo.example/landing")?;
    assert_eq!(first, AppState::FirstLaunch(expected.clone()));
    assert!(LaunchStore::new(state.path()).has_launched_before().await?);

    let second = LaunchDependencies::build(
        configuration(&server_url, false)?,
        &options,
        presenter.clone(),
    )
    .await?
    .run()
    .await?;
    assert_eq!(second, AppState::Web(expected.clone()));

    let screens = presenter.screens();
    assert_eq!(screens.len(), 2);
    assert!(matches!(
        &screens[0],
        Screen::NotificationPrompt {
            first_launch: true,
            ..
        }
    ));
    assert_eq!(screens[1], Screen::Web { url: expected });
    Ok(())
}

#[tokio::test]
async fn remote_payload_carries_conversion_and_technical_fields() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let config = configuration(&server.url("/config.php"), false)?;
    let mut conversion_data = ConversionData::new();
    conversion_data.insert("af_status", "Non-organic");
    conversion_data.insert("campaign", "spring");
    let expected = build_payload(
        &conversion_data,
        &TechnicalFields::from_config(&config, Some("attr-1".into()), Some("push-token-1")),
    );
    assert_eq!(expected.get("bundle_id"), Some("com.example.portico"));

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/config.php")
            .json_body(serde_json::to_value(&expected).unwrap_or_default());
        then.status(200).json_body(serde_json::json!({ "url": null }));
    });

    let state = TempDir::new()?;
    let conversion = TempDir::new()?;
    let options = options(&state, &conversion)?;
    let presenter = Arc::new(RecordingPresenter::default());

    let outcome = LaunchDependencies::build(config, &options, presenter.clone())
        .await?
        .run()
        .await?;

    assert_eq!(outcome, AppState::Game);
    assert_eq!(presenter.screens(), vec![Screen::Game]);
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn remote_failure_still_records_the_launch() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/config.php");
        then.status(500);
    });

    let state = TempDir::new()?;
    let conversion = TempDir::new()?;
    let options = options(&state, &conversion)?;
    let presenter = Arc::new(RecordingPresenter::default());

    let outcome = LaunchDependencies::build(
        configuration(&server.url("/config.php"), true)?,
        &options,
        presenter,
    )
    .await?
    .run()
    .await?;

    assert_eq!(outcome, AppState::Game);
    assert!(LaunchStore::new(state.path()).has_launched_before().await?);
    Ok(())
}
