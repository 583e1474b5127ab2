//! Command-line surface for the Portico shell.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use portico_config::AppConfiguration;
use portico_telemetry::{LaunchContextGuard, LogFormat, LogStore, LoggingConfig};
use tracing::{error, warn};
use uuid::Uuid;

use crate::dependencies::{LaunchDependencies, LaunchOptions, load_configuration};
use crate::error::{AppError, AppResult};
use crate::presenter::{ConsolePresenter, OutputFormat};
use crate::store::LaunchStore;

#[derive(Parser)]
#[command(name = "portico", about = "Portico launch shell", version)]
struct Cli {
    #[arg(long, env = "PORTICO_CONFIG", global = true, help = "YAML configuration file")]
    config: Option<PathBuf>,
    #[arg(
        long,
        env = "PORTICO_LOG_FORMAT",
        value_enum,
        global = true,
        help = "Log output format (defaults by build profile)"
    )]
    log_format: Option<LogFormatArg>,
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve and present the launch experience.
    Launch(LaunchArgs),
    /// Print the effective configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct LaunchArgs {
    #[arg(long, env = "PORTICO_STATE_DIR", default_value = ".portico")]
    state_dir: PathBuf,
    #[arg(long, env = "PORTICO_PUSH_TOKEN")]
    push_token: Option<String>,
    #[arg(long, env = "PORTICO_PUSH_TOKEN_TIMEOUT_MS", default_value_t = 2_000)]
    push_token_timeout_ms: u64,
    #[arg(long, help = "JSON object delivered as attribution conversion data")]
    conversion_data: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    conversion_delay_ms: u64,
    #[arg(long, env = "PORTICO_ATTRIBUTION_ID", hide_env_values = true)]
    attribution_id: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(long, help = "Keep a bounded log history in the state directory")]
    log_store: bool,
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Parse arguments, run the selected command, and return the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

async fn dispatch(cli: Cli) -> AppResult<()> {
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        build_sha: option_env!("PORTICO_BUILD_SHA").unwrap_or("dev"),
    };
    match cli.command {
        Command::Launch(args) => launch(cli.config.as_deref(), &logging, args).await,
        Command::Config(args) => {
            portico_telemetry::init_logging(&logging)
                .map_err(|err| AppError::telemetry("telemetry.init", err))?;
            let rendered = load_configuration(cli.config.as_deref())
                .and_then(|config| render_configuration(&config, args.format))
                .inspect_err(|err| error!(error = %err, detail = ?err, "config command failed"))?;
            println!("{rendered}");
            Ok(())
        }
    }
}

async fn launch(
    config_path: Option<&Path>,
    logging: &LoggingConfig<'_>,
    args: LaunchArgs,
) -> AppResult<()> {
    let log_store = if args.log_store {
        LaunchStore::new(&args.state_dir).ensure_dir().await?;
        let store = LogStore::open(&args.state_dir)
            .map_err(|err| AppError::telemetry("log_store.open", err))?;
        portico_telemetry::init_logging_with_store(logging, &store)
            .map_err(|err| AppError::telemetry("telemetry.init", err))?;
        Some(store)
    } else {
        portico_telemetry::init_logging(logging)
            .map_err(|err| AppError::telemetry("telemetry.init", err))?;
        None
    };
    let _context = LaunchContextGuard::new(Uuid::new_v4().to_string());

    let outcome = resolve_launch(config_path, args).await;
    finish_launch(log_store.as_ref(), outcome)
}

async fn resolve_launch(config_path: Option<&Path>, args: LaunchArgs) -> AppResult<()> {
    let config = load_configuration(config_path)?;
    let options = LaunchOptions {
        push_token: args.push_token,
        push_token_timeout: Duration::from_millis(args.push_token_timeout_ms),
        conversion_data: args.conversion_data,
        conversion_delay: Duration::from_millis(args.conversion_delay_ms),
        attribution_id: args.attribution_id,
        ..LaunchOptions::new(args.state_dir)
    };
    let presenter = Arc::new(ConsolePresenter::new(args.format));
    LaunchDependencies::build(config, &options, presenter)
        .await?
        .run()
        .await
        .map(|_| ())
}

/// Log the launch outcome, then persist the log store. A persist failure never
/// replaces the launch outcome.
fn finish_launch(log_store: Option<&LogStore>, outcome: AppResult<()>) -> AppResult<()> {
    if let Err(err) = &outcome {
        error!(error = %err, detail = ?err, "launch failed");
    }
    if let Some(store) = log_store
        && let Err(err) = store.persist()
    {
        warn!(error = %err, "failed to persist log store");
    }
    outcome
}

fn render_configuration(config: &AppConfiguration, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(config).map_err(|source| AppError::Render { source })
        }
        OutputFormat::Text => {
            let flags = &config.flags;
            Ok([
                format!("server url: {}", config.server_url),
                format!("store id: {}", config.store_id_with_prefix()),
                format!("bundle id: {}", config.bundle_id),
                format!("locale: {}", config.locale),
                format!("os: {}", config.os),
                format!(
                    "flags: debug={} game_only={} web_only={} no_network={} \
                     ask_notifications={} infinity_loading={}",
                    flags.debug,
                    flags.game_only,
                    flags.web_only,
                    flags.no_network,
                    flags.ask_notifications,
                    flags.infinity_loading
                ),
            ]
            .join("\n"))
        }
    }
}
