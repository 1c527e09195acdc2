//! Command-line front end: one subcommand per invocation, with the session
//! carried between runs in client storage.

mod config;
mod render;
mod terminal;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use config::Config;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use task_manager_core::app::LOGIN_REQUIRED;
use task_manager_core::{
    ClientStorage, Command, Confirmer, FileStorage, Form, HttpTaskApi, Priority,
    SessionController, TaskApi, TaskDraft, TaskId, TaskManager,
};
use terminal::StdinConfirmer;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "task-manager", version, about = "Manage your tasks on a remote task backend")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Log in and show your tasks
    Login {
        username: String,
        /// Visible to other users in the process list; prefer leaving it out
        /// to be prompted without echo
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show your tasks
    List,
    /// Add a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value_t = Priority::Medium)]
        priority: Priority,
    },
    /// Change a task; fields left out keep their current values
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Delete a task
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Mark a task complete, or incomplete again
    Toggle { id: TaskId },
    /// Show who is logged in
    Whoami,
}

impl Commands {
    /// Whether a stored session should be picked up before running.
    fn resumes_session(&self) -> bool {
        !matches!(
            self,
            Commands::Login { .. } | Commands::Logout | Commands::Whoami
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(config.log_level()?)
        .init();
    debug!(?config, "Loaded configuration");

    let api = HttpTaskApi::new(config.api_url.as_str());
    let storage = FileStorage::new(config.storage_path.clone());

    if let Commands::Whoami = cli.command {
        whoami(&api, &storage)?;
        return Ok(ExitCode::SUCCESS);
    }

    let assume_yes = matches!(cli.command, Commands::Delete { yes: true, .. });
    let mut manager = TaskManager::new(api, storage, StdinConfirmer::new(assume_yes));
    if config.resume_session && cli.command.resumes_session() {
        manager.resume().await;
    }

    run(&mut manager, cli.command).await?;
    render::render(manager.state(), &mut io::stdout().lock())?;

    let state = manager.state();
    let failed = state.login_error().is_some() || state.notification().is_some_and(|n| n.is_error());
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

async fn run<API: TaskApi, STORAGE: ClientStorage, CONFIRM: Confirmer>(
    manager: &mut TaskManager<API, STORAGE, CONFIRM>,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => terminal::prompt_password(&username)?,
            };
            manager.dispatch(Command::Login { username, password }).await;
        }
        Commands::Logout => manager.dispatch(Command::Logout).await,
        Commands::List => {
            // A resumed session has already fetched
            if !manager.state().is_authenticated() {
                manager.dispatch(Command::Refresh).await;
            }
        }
        Commands::Add {
            title,
            description,
            priority,
        } => {
            if title.trim().is_empty() {
                bail!("Task title cannot be empty");
            }
            manager
                .dispatch(Command::AddTask(TaskDraft::new(title, description, priority)))
                .await;
        }
        Commands::Edit {
            id,
            title,
            description,
            priority,
        } => {
            if !ensure_cached(manager, &id).await? {
                return Ok(());
            }
            manager.dispatch(Command::EditTask(id)).await;
            let Form::Editing { draft, .. } = manager.state().form().clone() else {
                bail!("Could not open task for editing");
            };
            let draft = merge_draft(draft, title, description, priority);
            if draft.is_blank() {
                bail!("Task title cannot be empty");
            }
            manager.dispatch(Command::SubmitForm(draft)).await;
        }
        Commands::Delete { id, .. } => {
            if ensure_cached(manager, &id).await? {
                manager.dispatch(Command::DeleteTask(id)).await;
            }
        }
        Commands::Toggle { id } => {
            if ensure_cached(manager, &id).await? {
                manager.dispatch(Command::ToggleComplete(id)).await;
            }
        }
        Commands::Whoami => {}
    }
    Ok(())
}

/// Returns `Ok(false)` when the command cannot run and the state already
/// says why: there is no session (the manager asks for a login), or the
/// fetch after resuming failed and left its error notification.
async fn ensure_cached<API: TaskApi, STORAGE: ClientStorage, CONFIRM: Confirmer>(
    manager: &mut TaskManager<API, STORAGE, CONFIRM>,
    id: &TaskId,
) -> anyhow::Result<bool> {
    if !manager.state().is_authenticated() {
        manager.dispatch(Command::Refresh).await;
        return Ok(false);
    }
    if manager.state().notification().is_some_and(|n| n.is_error()) {
        return Ok(false);
    }
    if manager.state().tasks().get(id).is_none() {
        bail!("Task {} is not in the task list", id);
    }
    Ok(true)
}

fn merge_draft(
    current: TaskDraft,
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
) -> TaskDraft {
    TaskDraft {
        title: title.unwrap_or(current.title),
        description: description.unwrap_or(current.description),
        priority: priority.unwrap_or(current.priority),
    }
}

fn whoami(api: &HttpTaskApi, storage: &FileStorage) -> anyhow::Result<()> {
    let session = SessionController::new(api, storage)
        .restore()
        .with_context(|| format!("could not read {}", storage.path().display()))?;
    match session {
        Some(session) if !session.username().is_empty() => {
            println!("Logged in as {}", session.username())
        }
        Some(_) => println!("Logged in"),
        None => println!("{}", LOGIN_REQUIRED),
    }
    Ok(())
}
