use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::mpsc;

mod application;
mod domain;
mod infrastructure;

use application::services::SessionController;
use infrastructure::adapters::discord::{Handler, SongbirdGateway};
use infrastructure::config::Config;

use serenity::client::Client;
use serenity::prelude::GatewayIntents;
use songbird::{SerenityInit, Songbird};

#[derive(Parser)]
#[command(name = "nova-bot")]
#[command(about = "A radio streaming bot for Discord voice channels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
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

    // Pick up a local .env before reading any variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_bot(cli.config, cli.token);
        }
        Commands::Version => {
            println!("nova-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn run_bot(config_path: String, token_override: Option<String>) {
    // Load config, environment on top
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        Config::default()
    };
    let config = config.apply_env();

    let Some(token) = token_override.or_else(|| config.discord.token.clone()) else {
        tracing::error!("No bot token. Set DISCORD_TOKEN or discord.token in config.yaml");
        std::process::exit(1);
    };

    if config.stream.url.is_none() {
        // Startup still succeeds; /play reports the missing URL per guild.
        tracing::warn!("No stream URL configured, /play will be unavailable");
    }
    tracing::info!("Starting nova-bot with volume {:.1}", config.stream.volume);

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let manager = Songbird::serenity();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let gateway = Arc::new(SongbirdGateway::new(manager.clone(), events_tx));
        let controller = Arc::new(SessionController::new(
            gateway,
            config.stream.url.clone(),
            config.stream.volume,
        ));

        // Feed driver events (track ended, dropped connection) back into
        // the sessions.
        let event_sink = controller.clone();
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                event_sink.handle_event(event).await;
            }
        });

        let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;
        let client = Client::builder(&token, intents)
            .event_handler(Handler::new(controller, config.discord.guild_id))
            .register_songbird_with(manager)
            .await;

        match client {
            Ok(mut client) => {
                if let Err(e) = client.start().await {
                    tracing::error!("Client error: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to build Discord client: {}", e);
                std::process::exit(1);
            }
        }
    });
}

fn init_config() {
    let config = Config::default();
    match config.to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render config: {}", e),
    }
}
