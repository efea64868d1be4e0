use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings,
    error::{IdentityError, SessionError},
    identity::IdentityClient,
    session::SessionStore,
    HttpPostStore, PostDraft, SyncController, SyncError, SyncEvent,
};
use shared::domain::{PostId, User};
use tokio::sync::broadcast;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod view;

#[derive(Parser, Debug)]
#[command(about = "View, create and delete your posts")]
struct Cli {
    /// Post store base URL; overrides profile.toml and environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    session_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    List,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    Delete {
        post_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(session_path) = cli.session_path {
        settings.session_path = session_path;
    }
    let base_url = settings.server_url()?;
    let http = settings.http_client()?;
    let sessions = SessionStore::new(settings.session_path.clone());

    match cli.command {
        Command::Login { email, password } => {
            let identity = IdentityClient::with_client(http, base_url);
            let user = match identity.authenticate(&email, &password).await {
                Ok(user) => user,
                Err(IdentityError::InvalidCredentials) => {
                    eprintln!("Invalid email or password.");
                    return Ok(ExitCode::FAILURE);
                }
                Err(err) => return Err(err).context("sign-in failed"),
            };
            sessions.save(&user)?;
            println!("Signed in as {}.", user.display_name());
            Ok(ExitCode::SUCCESS)
        }
        Command::Logout => {
            sessions.clear()?;
            println!("Signed out.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami => {
            let Some(user) = require_session(&sessions)? else {
                return Ok(ExitCode::FAILURE);
            };
            println!("{} <{}> (id: {})", user.display_name(), user.email, user.id);
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let Some(user) = require_session(&sessions)? else {
                return Ok(ExitCode::FAILURE);
            };
            let store = HttpPostStore::with_client(http, base_url);
            run_profile(SyncController::new(Arc::new(store)), &user, command).await
        }
    }
}

/// Loads the signed-in user. A missing or unreadable session sends the user
/// back to `login` rather than failing the process.
fn require_session(sessions: &SessionStore) -> Result<Option<User>> {
    match sessions.load() {
        Ok(user) => Ok(Some(user)),
        Err(SessionError::Missing(_)) => {
            eprintln!("Not signed in. Run `profile login --email <email> --password <password>`.");
            Ok(None)
        }
        Err(err @ SessionError::Corrupt { .. }) => {
            eprintln!("{err}. Run `profile login` to sign in again.");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_profile(
    controller: Arc<SyncController>,
    user: &User,
    command: Command,
) -> Result<ExitCode> {
    let watcher = tokio::spawn(log_state_changes(controller.subscribe()));

    let state = match controller.initialize(user).await {
        Ok(state) => state,
        Err(SyncError::Precondition(reason)) => {
            eprintln!("Stored session is unusable ({reason}). Run `profile login`.");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    let state = match command {
        Command::Create { title, text } => {
            controller
                .create_post(user, PostDraft::new(title, text))
                .await
        }
        Command::Delete { post_id } => {
            let post_id = PostId::new(post_id);
            // Only posts listed on this profile can be deleted from it.
            if !state.posts.iter().any(|post| post.id == post_id) {
                eprintln!("No post {post_id} on your profile.");
                return Ok(ExitCode::FAILURE);
            }
            controller.delete_post(user, &post_id).await
        }
        _ => state,
    };
    watcher.abort();

    print!("{}", view::render(user, &state));
    Ok(if state.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn log_state_changes(mut events: broadcast::Receiver<SyncEvent>) {
    while let Ok(SyncEvent::StateChanged(state)) = events.recv().await {
        debug!(
            loading = state.is_loading,
            posts = state.posts.len(),
            error = state.error.as_deref().unwrap_or(""),
            "profile state changed"
        );
    }
}
