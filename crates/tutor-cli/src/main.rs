//! Interactive terminal front end for the Tutor session store.
//!
//! A thin presentation layer: it reads snapshots and forwards intents, holding
//! no conversation state of its own.

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tutor_core::{FileMeta, Sender, TutorError};
use tutor_session::{SessionStore, Snapshot, StoreConfig};

/// File extensions the upload dialog advertises. Advisory only; the store
/// accepts any file.
const ACCEPTED_EXTENSIONS: [&str; 7] = ["pdf", "doc", "docx", "txt", "md", "json", "csv"];

#[derive(Parser)]
#[command(name = "tutor", about = "Tutor — AI tutor session console")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "tutor.toml")]
    config: PathBuf,

    /// Override the simulated reply delay (milliseconds)
    #[arg(long)]
    reply_delay_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct TutorConfig {
    #[serde(default)]
    store: StoreConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = load_config(&cli.config).await?;
    if let Some(delay) = cli.reply_delay_ms {
        config.store.reply_delay_ms = delay;
    }

    info!(reply_delay_ms = config.store.reply_delay_ms, "starting session store");
    let store = SessionStore::new(config.store);
    run_console(store).await
}

async fn load_config(path: &Path) -> anyhow::Result<TutorConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(TutorConfig::default());
    }
    let config_str = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
    Ok(toml::from_str(&config_str)?)
}

async fn run_console(store: SessionStore) -> anyhow::Result<()> {
    let mut rx = store.subscribe();
    let mut last_seen = rx.borrow_and_update().clone();
    render_history(&last_seen);
    print_prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&store, line.trim()).await {
                    break;
                }
                print_prompt();
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = rx.borrow_and_update().clone();
                render_delta(&last_seen, &next);
                last_seen = next;
                print_prompt();
            }
        }
    }
    Ok(())
}

/// Handles one input line. Returns false to quit.
async fn handle_line(store: &SessionStore, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    if !line.starts_with('/') {
        // The store rejects blank text; anything else cannot fail.
        if let Err(err) = store.send_user_message(line).await {
            debug!(error = %err, "message not sent");
        }
        return true;
    }

    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let argument = parts.next().unwrap_or_default().trim();

    let result = match command {
        "/quit" | "/exit" => return false,
        "/help" => {
            print_help();
            Ok(())
        }
        "/new" => store.start_new_session().await,
        "/sessions" => {
            list_sessions(&store.snapshot());
            Ok(())
        }
        "/switch" => switch_by_index(store, argument).await,
        "/upload" => upload_paths(store, argument).await,
        "/docs" => {
            list_documents(&store.snapshot());
            Ok(())
        }
        "/rm" => remove_by_index(store, argument).await,
        "/clear" => store.clear_current_session().await,
        "/reset" => store.clear_all_history().await,
        _ => {
            println!("unknown command: {command} (try /help)");
            Ok(())
        }
    };
    if let Err(err) = result {
        println!("{err}");
    }
    true
}

async fn switch_by_index(store: &SessionStore, argument: &str) -> Result<(), TutorError> {
    let snapshot = store.snapshot();
    let index: usize = argument
        .parse()
        .map_err(|_| TutorError::InvalidInput("usage: /switch <session number>".into()))?;
    let summary = snapshot
        .sessions
        .get(index)
        .ok_or_else(|| TutorError::NotFound(format!("no session #{index}")))?;
    store.switch_session(summary.id).await
}

async fn remove_by_index(store: &SessionStore, argument: &str) -> Result<(), TutorError> {
    let snapshot = store.snapshot();
    let index: usize = argument
        .parse()
        .map_err(|_| TutorError::InvalidInput("usage: /rm <document number>".into()))?;
    let document = snapshot
        .documents
        .get(index)
        .ok_or_else(|| TutorError::NotFound(format!("no document #{index}")))?;
    store.remove_document(document.id).await
}

async fn upload_paths(store: &SessionStore, argument: &str) -> Result<(), TutorError> {
    let mut files = Vec::new();
    for raw in argument.split_whitespace() {
        let path = Path::new(raw);
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| raw.to_string());

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        if !extension
            .as_deref()
            .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e))
        {
            warn!(file = %name, "file type is not in the accepted list, uploading anyway");
        }

        files.push(FileMeta::new(
            name,
            metadata.len(),
            extension.as_deref().and_then(mime_for),
        ));
    }
    if files.is_empty() {
        return Err(TutorError::InvalidInput("usage: /upload <path>...".into()));
    }
    store.upload_documents(files).await
}

fn mime_for(extension: &str) -> Option<&'static str> {
    match extension {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "txt" => Some("text/plain"),
        "md" => Some("text/markdown"),
        "json" => Some("application/json"),
        "csv" => Some("text/csv"),
        _ => None,
    }
}

fn list_sessions(snapshot: &Snapshot) {
    for (index, summary) in snapshot.sessions.iter().enumerate() {
        let marker = if summary.id == snapshot.active_session_id {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} [{index}] {} ({} messages) — {}",
            summary.title, summary.message_count, summary.preview
        );
    }
}

fn list_documents(snapshot: &Snapshot) {
    if snapshot.documents.is_empty() {
        println!("no documents uploaded yet");
        return;
    }
    for (index, document) in snapshot.documents.iter().enumerate() {
        println!(
            "[{index}] {} ({}, {})",
            document.name,
            document.human_size(),
            document.mime_type
        );
    }
}

fn render_history(snapshot: &Snapshot) {
    for message in &snapshot.messages {
        print_message(message.sender, &message.content);
    }
}

/// Prints what changed between two snapshots. A switch or clear re-renders the
/// whole visible history; otherwise only newly arrived AI messages print (the
/// user's own text is already on screen).
fn render_delta(previous: &Snapshot, next: &Snapshot) {
    if next.active_session_id != previous.active_session_id
        || next.messages.len() < previous.messages.len()
    {
        println!("--- {} ---", active_title(next));
        render_history(next);
        return;
    }
    for message in &next.messages[previous.messages.len()..] {
        if message.sender == Sender::Ai {
            print_message(message.sender, &message.content);
        }
    }
}

fn active_title(snapshot: &Snapshot) -> String {
    snapshot
        .sessions
        .iter()
        .find(|s| s.id == snapshot.active_session_id)
        .map(|s| s.title.clone())
        .unwrap_or_default()
}

fn print_message(sender: Sender, content: &str) {
    match sender {
        Sender::Ai => println!("tutor> {content}"),
        Sender::User => println!("you> {content}"),
    }
}

fn print_prompt() {
    use std::io::Write;
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!("/new              start a new session");
    println!("/sessions         list sessions");
    println!("/switch <n>       switch to session n");
    println!("/upload <path>..  upload files (metadata only)");
    println!("/docs             list uploaded documents");
    println!("/rm <n>           remove document n");
    println!("/clear            clear the current session");
    println!("/reset            clear all history");
    println!("/quit             exit");
}
