use std::sync::Arc;

use clap::{Parser, Subcommand};

use brando_bot::application::commands::{self, Integrations};
use brando_bot::application::errors::{BotError, CommandError};
use brando_bot::application::messaging::Router;
use brando_bot::domain::entities::{DisplayUnit, ReplyTarget};
use brando_bot::domain::traits::{ChatEvent, ChatPlatform};
use brando_bot::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use brando_bot::infrastructure::clients::{BoardsClient, TimelineClient, WeatherClient};
use brando_bot::infrastructure::config::{Config, TelegramConfig};

/// Consecutive poll failures tolerated before the process gives up
const MAX_POLL_FAILURES: u32 = 5;

#[derive(Parser)]
#[command(name = "brando-bot")]
#[command(about = "A chat bot bridging timelines, boards and weather", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Platform token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_bot(cli.config, cli.token);
        }
        Commands::Version => {
            println!("brando-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn run_bot(config_path: String, token_override: Option<String>) {
    let mut config = if std::path::Path::new(&config_path).exists() {
        match Config::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load config {}: {}", config_path, e);
                std::process::exit(1);
            }
        }
    } else {
        Config::load_env()
    };

    if let Some(token) = token_override {
        let telegram = config.platform.telegram.get_or_insert(TelegramConfig {
            enabled: false,
            token: None,
        });
        telegram.token = Some(token);
        telegram.enabled = true;
    }

    // Credential gaps are fatal before any connection opens
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Starting {}", config.bot.name);

    let integrations = build_integrations(&config);
    let mut router = Router::new(&config.bot.prefix);
    if let Err(e) = commands::register_all(&mut router, &integrations, config.bot.message_limit) {
        tracing::error!("Command registration failed: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Registered {} commands", router.command_count());
    let router = Arc::new(router);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let telegram_token = config
        .platform
        .telegram
        .as_ref()
        .filter(|t| t.enabled)
        .and_then(|t| t.token.clone());

    rt.block_on(async move {
        if let Some(token) = telegram_token {
            let platform = Arc::new(TelegramAdapter::new(token));
            run_event_loop(platform, router, &config).await;
        } else {
            // Dev mode
            let platform = Arc::new(ConsoleAdapter::new());
            run_event_loop(platform, router, &config).await;
        }
    });
}

fn build_integrations(config: &Config) -> Integrations {
    let mut integrations = Integrations::default();
    if let Some(timeline) = &config.integrations.timeline {
        if timeline.enabled {
            if let Some(token) = &timeline.bearer_token {
                integrations.timeline = Some(Arc::new(TimelineClient::new(token)));
            }
        }
    }
    if let Some(boards) = &config.integrations.boards {
        if boards.enabled {
            integrations.boards = Some(Arc::new(BoardsClient::new(config.boards_user_agent())));
        }
    }
    if let Some(weather) = &config.integrations.weather {
        if weather.enabled {
            if let Some(key) = &weather.api_key {
                integrations.weather = Some(Arc::new(WeatherClient::new(key)));
            }
        }
    }
    integrations
}

async fn run_event_loop<P: ChatPlatform + 'static>(
    platform: Arc<P>,
    router: Arc<Router>,
    config: &Config,
) {
    if let Err(e) = platform.connect().await {
        tracing::error!("Failed to connect to platform: {}", e);
        return;
    }
    let info = platform.platform_info();
    tracing::info!("{} is connected as @{}", config.bot.name, info.username);

    if let Some(home) = &config.bot.home_chat_id {
        let notice = DisplayUnit::text(format!(
            "{} is watching your every move. Use {}help for a list of commands",
            config.bot.name, config.bot.prefix
        ));
        if let Err(e) = platform.send_to_channel(home, &notice).await {
            tracing::warn!("Startup notice failed: {}", e);
        }
    }

    let mut failures = 0u32;
    loop {
        match platform.next_events().await {
            Ok(events) => {
                failures = 0;
                for event in events {
                    tokio::spawn(handle_event(platform.clone(), router.clone(), event));
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!("Polling failed ({}/{}): {}", failures, MAX_POLL_FAILURES, e);
                if failures >= MAX_POLL_FAILURES {
                    tracing::error!("Platform connection lost, shutting down");
                    return;
                }
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            }
        }
    }
}

/// One invocation, end to end. Concurrent invocations share nothing but
/// the read-only router and the platform handle.
async fn handle_event<P: ChatPlatform + 'static>(
    platform: Arc<P>,
    router: Arc<Router>,
    event: ChatEvent,
) {
    match event {
        ChatEvent::Message {
            chat_id,
            sender,
            text,
        } => {
            if sender.is_bot {
                return;
            }
            let sender_id = sender.id.clone();
            match router.dispatch(sender, &chat_id, &text).await {
                Ok(Some(reply)) => {
                    // Units go out in formatter order; a failed send stops
                    // the rest so nothing arrives out of sequence
                    for unit in &reply.units {
                        let sent = match reply.target {
                            ReplyTarget::Channel => platform.send_to_channel(&chat_id, unit).await,
                            ReplyTarget::Direct => platform.send_direct(&sender_id, unit).await,
                        };
                        if let Err(e) = sent {
                            tracing::error!("Send failed: {}", e);
                            break;
                        }
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("Command failed: {}", err);
                    let notice = DisplayUnit::text(failure_notice(&err));
                    if let Err(e) = platform.send_to_channel(&chat_id, &notice).await {
                        tracing::error!("Failure notice undeliverable: {}", e);
                    }
                }
            }
        }
        ChatEvent::MemberJoined { chat_id, user } => {
            let notice = DisplayUnit::text(format!(
                "{} - you thought this was a welcome message, but it was I, brando-bot!",
                user.display_name()
            ));
            if let Err(e) = platform.send_to_channel(&chat_id, &notice).await {
                tracing::error!("Welcome message failed: {}", e);
            }
        }
    }
}

/// Every failure category becomes exactly one user-visible message
fn failure_notice(err: &BotError) -> String {
    match err {
        BotError::Command(CommandError::Unknown(name)) => {
            format!("Unknown command: {}. Try help", name)
        }
        BotError::Command(e) => e.to_string(),
        BotError::Upstream { integration, .. } => {
            format!("The {} request failed, try again later", integration)
        }
        BotError::Format(e) => e.to_string(),
        _ => "Something went wrong handling that command".to_string(),
    }
}

fn init_config() {
    let yaml = match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => yaml,
        Err(e) => {
            tracing::error!("Failed to render default config: {}", e);
            return;
        }
    };
    if let Err(e) = std::fs::write("config.yaml", yaml) {
        tracing::error!("Failed to write config.yaml: {}", e);
    } else {
        println!("Wrote default config to config.yaml");
    }
}
