//! Main entry point for Typhoon Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use typhoon_translator::cli::commands::{self, Commands};
use typhoon_translator::{Credential, FileStore, TranslationRequestManager, TranslationSession, TranslatorConfig};

/// Typhoon Translator - Thai/English translation from the terminal
#[derive(Parser, Debug)]
#[command(name = "typhoon-translator", version, about, long_about = None)]
struct Args {
    /// API key for this run only (the stored key is used otherwise)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// JSON configuration file (environment variables are used otherwise)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the API key and history store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Chat-completions endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging; stdout is reserved for translations
    let log_level = if args.verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("typhoon_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(command) = args.command else {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    };

    let mut config = match &args.config {
        Some(path) => TranslatorConfig::from_file(path)?,
        None => TranslatorConfig::from_env()?,
    };

    // Override config with CLI args if provided
    if let Some(endpoint) = args.endpoint {
        config.api_endpoint = endpoint;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = Some(data_dir);
    }
    debug!("Using endpoint {}", config.api_endpoint);

    let store = FileStore::open_default(config.data_dir.as_deref())?;
    debug!("Using store {}", store.path().display());

    let manager = TranslationRequestManager::new(config)?;
    let mut session = TranslationSession::open(store, manager);

    if let Some(credential) = args.api_key.as_deref().and_then(Credential::new) {
        session.override_credential(credential);
    }

    if let Err(err) = commands::run(&mut session, command).await {
        commands::report_error(&err);
        std::process::exit(1);
    }

    Ok(())
}
