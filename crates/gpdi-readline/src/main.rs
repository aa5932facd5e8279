mod commands;
mod helper;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use gpdi_application::{
    ChatOrchestrator, Collaborators, LanguageChange, TurnOutcome, TurnRecord, TurnSource,
};
use gpdi_core::language::Translator;
use gpdi_core::retrieval::FallbackRetriever;
use gpdi_infrastructure::{ConfigService, DataDir, DirSessionRepository, JsonKnowledgeRepository};
use gpdi_interaction::{GoogleTranslator, IdentityTranslator, OfflineRetriever, WebSearchRetriever};

use crate::commands::{Command, HELP};
use crate::helper::CliHelper;

type Repl = Editor<CliHelper, DefaultHistory>;

#[derive(Parser)]
#[command(name = "gpdi", version)]
#[command(about = "Gpd-i - a chat companion that learns the answers you teach it", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the knowledge base, conversations and logs live
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Display language for this run, e.g. `fr`
    #[arg(long)]
    lang: Option<String>,

    /// Skip translation and web search
    #[arg(long)]
    offline: bool,

    /// Mirror debug logs to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Configuration =====
    let config_service = match &cli.config {
        Some(path) => ConfigService::new(path),
        None => ConfigService::at_default_location()?,
    };
    let config = config_service
        .load()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

    let data_dir = DataDir::resolve(
        cli.data_dir
            .as_deref()
            .or(config.storage.data_dir.as_deref()),
    )?;
    data_dir
        .ensure()
        .with_context(|| format!("Failed to create {}", data_dir.root().display()))?;

    let _log_guard = logging::init(&data_dir.logs_dir(), cli.verbose)?;
    tracing::info!(
        data_dir = %data_dir.root().display(),
        offline = cli.offline,
        "gpdi v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    // ===== Backend Initialization =====
    let translator: Arc<dyn Translator> = if cli.offline || !config.translation.enabled {
        Arc::new(IdentityTranslator)
    } else {
        Arc::new(GoogleTranslator::new(&config.translation)?)
    };
    let retriever: Arc<dyn FallbackRetriever> = if cli.offline {
        Arc::new(OfflineRetriever)
    } else {
        Arc::new(WebSearchRetriever::new(&config.search)?)
    };

    let collaborators = Collaborators {
        knowledge: Box::new(JsonKnowledgeRepository::new(data_dir.knowledge_file())),
        sessions: Box::new(DirSessionRepository::new(data_dir.sessions_dir())?),
        translator,
        retriever,
    };
    let mut chat = ChatOrchestrator::new(&config, collaborators)
        .context("Failed to open the knowledge base")?;

    if let Some(lang) = &cli.lang {
        chat.set_ui_language(lang)?;
    }

    run_repl(&mut chat).await
}

async fn run_repl(chat: &mut ChatOrchestrator) -> Result<()> {
    let mut rl: Repl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));
    sync_helper(&mut rl, chat);

    println!("{}", "=== Gpd-i ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Known phrases: {}. Language: {}. Type '/help' for commands or 'quit' to exit.",
            chat.knowledge().len(),
            chat.ui_language()
        )
        .bright_black()
    );
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match commands::parse(trimmed) {
                    Command::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Command::Say(text) => {
                        say(chat, &mut rl, &text).await?;
                        sync_helper(&mut rl, chat);
                    }
                    Command::New => {
                        chat.new_session();
                        println!("{}", "Started a new conversation.".bright_black());
                    }
                    Command::Chats => {
                        list_sessions(chat);
                        sync_helper(&mut rl, chat);
                    }
                    Command::Open(id) => match chat.select_session(id) {
                        Ok(turns) => {
                            println!("{}", format!("--- {} ---", id).bright_magenta());
                            for turn in turns {
                                println!("{}", format!("> {}", turn.user_input).green());
                                print_response(&turn.response);
                            }
                        }
                        Err(e) => print_error(&e),
                    },
                    Command::Delete(id) => {
                        match chat.delete_session(id) {
                            Ok(()) => println!("{}", format!("Deleted {}.", id).bright_black()),
                            Err(e) => print_error(&e),
                        }
                        sync_helper(&mut rl, chat);
                    }
                    Command::Lang(code) => match chat.set_ui_language(&code) {
                        Ok(LanguageChange::Changed) => println!(
                            "{}",
                            format!("Language set to {}.", chat.ui_language()).bright_black()
                        ),
                        Ok(LanguageChange::Unchanged) => println!(
                            "{}",
                            format!("{} is already the current language.", chat.ui_language())
                                .yellow()
                        ),
                        Err(e) => {
                            print_error(&e);
                            let supported: Vec<&str> = chat
                                .supported_languages()
                                .iter()
                                .map(|code| code.as_str())
                                .collect();
                            println!(
                                "{}",
                                format!("Supported: {}", supported.join(", ")).bright_black()
                            );
                        }
                    },
                    Command::Help => println!("{}", HELP.bright_black()),
                    Command::Invalid(message) => println!("{}", message.yellow()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

/// Runs one turn, prompting for a correction when nothing could answer.
async fn say(chat: &mut ChatOrchestrator, rl: &mut Repl, text: &str) -> Result<()> {
    let pending = match chat.handle_turn(text).await {
        Ok(TurnOutcome::Answered(record)) => {
            print_record(&record);
            return Ok(());
        }
        Ok(TurnOutcome::NeedsCorrection(pending)) => pending,
        Err(e) => {
            print_error(&e);
            return Ok(());
        }
    };

    println!("{}", capitalize(pending.reason().reason()).yellow());
    print_response(pending.message());

    let correction = match rl.readline("teach> ") {
        Ok(line) => Some(line),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
        Err(err) => return Err(err.into()),
    };

    match chat.resolve_correction(pending, correction.as_deref()).await {
        Ok(record) => print_record(&record),
        Err(e) => print_error(&e),
    }
    Ok(())
}

/// Hands the current conversation ids and languages to the line editor.
fn sync_helper(rl: &mut Repl, chat: &ChatOrchestrator) {
    if let Some(helper) = rl.helper_mut() {
        helper.set_sessions(&chat.sessions());
        helper.set_languages(chat.supported_languages());
    }
}

fn list_sessions(chat: &mut ChatOrchestrator) {
    let sessions = match chat.refresh_sessions() {
        Ok(sessions) => sessions,
        Err(e) => {
            print_error(&e);
            return;
        }
    };

    if sessions.is_empty() {
        println!("{}", "No saved conversations yet.".bright_black());
        return;
    }

    let active = chat.active_session();
    for id in sessions {
        if Some(id) == active {
            println!("{}", format!("* {}", id).bright_green());
        } else {
            println!("  {}", id);
        }
    }
}

fn print_record(record: &TurnRecord) {
    print_response(&record.response);

    let provenance = match &record.source {
        TurnSource::Knowledge { key, ratio } => {
            format!("matched \"{}\" ({:.0}%)", key, ratio * 100.0)
        }
        TurnSource::Fallback => "from web search".to_string(),
        TurnSource::Learned => "learned".to_string(),
        TurnSource::Unanswered => return,
    };
    println!("{}", format!("  [{} · {}]", provenance, record.session_id).bright_black());
}

fn print_response(response: &str) {
    for line in response.lines() {
        println!("{}", line.bright_blue());
    }
}

fn print_error(err: &gpdi_core::GpdiError) {
    tracing::warn!("{}", err);
    eprintln!("{}", err.to_string().red());
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
