//! CLI command definitions and handlers

use chrono::Local;
use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::errors::TranslationError;
use crate::core::models::Direction;
use crate::core::session::TranslationSession;
use crate::core::store::KeyValueStore;

/// Commands for Typhoon Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate text between Thai and English
    Translate {
        /// Text to translate (read from stdin when omitted)
        text: Option<String>,

        /// Translation direction
        #[arg(short, long, value_enum, default_value_t = Direction::ThaiToEnglish)]
        direction: Direction,

        /// Reverse the chosen direction
        #[arg(long)]
        swap: bool,
    },

    /// Manage the stored OpenTyphoon API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Show or edit translation history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,
    /// Write the effective configuration to a file usable with --config
    Write {
        /// Destination JSON file
        path: PathBuf,
    },
}

/// API key subcommands
#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Save an API key
    Set {
        /// The API key
        key: String,
    },
    /// Show the stored key (masked)
    Show,
    /// Delete the stored key
    Clear,
}

/// History subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List entries, newest first
    List {
        /// Show at most this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Remove one entry by its number in `history list`
    Remove {
        /// Entry number (1 = newest)
        number: usize,
    },
    /// Remove every entry
    Clear,
}

/// Dispatch a parsed command
pub async fn run<S: KeyValueStore>(
    session: &mut TranslationSession<S>,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Translate {
            text,
            direction,
            swap,
        } => handle_translate(session, text, direction, swap).await,
        Commands::Key { action } => handle_key(session, action),
        Commands::History { action } => handle_history(session, action),
        Commands::Config { action } => handle_config(session, action),
    }
}

/// Handle translate command
pub async fn handle_translate<S: KeyValueStore>(
    session: &mut TranslationSession<S>,
    text: Option<String>,
    direction: Direction,
    swap: bool,
) -> anyhow::Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    session.set_direction(direction);
    if swap {
        session.swap_direction();
    }

    let direction = session.state().direction;
    info!("Translating ({})", direction);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Translating {}...", direction.label()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = session.translate(&text).await;

    // The spinner goes away on every outcome.
    pb.finish_and_clear();

    let result = result?;
    println!("{}", sanitize_for_terminal(&result.translated_text));

    Ok(())
}

/// Handle key subcommands
pub fn handle_key<S: KeyValueStore>(
    session: &mut TranslationSession<S>,
    action: KeyAction,
) -> anyhow::Result<()> {
    match action {
        KeyAction::Set { key } => {
            session.set_credential(&key)?;
            println!("✅ API key saved");
        }
        KeyAction::Show => match &session.state().credential {
            Some(credential) => println!("{}", credential.masked()),
            None => println!("No API key stored"),
        },
        KeyAction::Clear => {
            session.clear_credential()?;
            println!("✅ API key cleared");
        }
    }

    Ok(())
}

/// Handle history subcommands
pub fn handle_history<S: KeyValueStore>(
    session: &mut TranslationSession<S>,
    action: HistoryAction,
) -> anyhow::Result<()> {
    match action {
        HistoryAction::List { limit } => {
            let history = session.history();
            if history.is_empty() {
                println!("No translation history");
                return Ok(());
            }

            let limit = limit.unwrap_or(history.len());
            for (i, entry) in history.iter().take(limit).enumerate() {
                println!(
                    "{}. [{}] {}",
                    i + 1,
                    entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    entry.direction.label()
                );
                println!("   {}", sanitize_for_terminal(&entry.source_text));
                println!("   → {}", sanitize_for_terminal(&entry.translated_text));
            }
        }
        HistoryAction::Remove { number } => {
            let index = display_number_to_index(number, session.history().len())?;
            let removed = session.remove_history_entry(index)?;
            println!(
                "✅ Removed entry {}: {}",
                number,
                sanitize_for_terminal(&removed.source_text)
            );
        }
        HistoryAction::Clear => {
            session.clear_history()?;
            println!("✅ History cleared");
        }
    }

    Ok(())
}

/// Handle config subcommands
pub fn handle_config<S: KeyValueStore>(
    session: &TranslationSession<S>,
    action: ConfigAction,
) -> anyhow::Result<()> {
    let config = session.config();
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigAction::Write { path } => {
            config.to_file(&path)?;
            info!("Wrote configuration to {}", path.display());
            println!("✅ Configuration written to {}", path.display());
        }
    }

    Ok(())
}

/// Convert a 1-based listing number to a history index
fn display_number_to_index(number: usize, len: usize) -> Result<usize, TranslationError> {
    number
        .checked_sub(1)
        .ok_or(TranslationError::HistoryIndexOutOfRange { index: 0, len })
}

/// Strip control characters (other than newline and tab) so stored or
/// returned text cannot drive the terminal.
pub fn sanitize_for_terminal(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Print a failed command for the user
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<TranslationError>() {
        Some(e) => {
            warn!("Command failed: {}", e);
            eprintln!("❌ {}", e.user_message());
        }
        None => {
            warn!("Command failed: {:#}", err);
            eprintln!("❌ {:#}", err);
        }
    }
}
