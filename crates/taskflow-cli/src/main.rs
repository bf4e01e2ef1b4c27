//! TaskFlow terminal client.
//!
//! A thin driver around `taskflow-core`: sign up, sign in, and work the
//! task list from a shell. Notifications print to stderr; set `RUST_LOG`
//! for the underlying request/flow logs.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use taskflow_core::models::TaskCreate;
use taskflow_core::notify::{Navigator, Notifier, Route};
use taskflow_core::{ApiClient, AuthState, Config, TokenStore};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Toasts become stderr lines.
struct CliNotifier;

impl Notifier for CliNotifier {
    fn success(&self, message: &str) {
        eprintln!("✓ {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }
}

/// There is no routing surface in a one-shot CLI; record the intent.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn go(&self, route: Route) {
        debug!(?route, "navigation requested");
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn usage() {
    eprintln!("TaskFlow CLI\n");
    eprintln!("Usage: taskflow <command>\n");
    eprintln!("Commands:");
    eprintln!("  signup              Create an account and sign in");
    eprintln!("  login               Sign in");
    eprintln!("  logout              Sign out");
    eprintln!("  whoami              Show the signed-in user");
    eprintln!("  list                List tasks");
    eprintln!("  add <title> [desc]  Create a task");
    eprintln!("  done <task-id>      Toggle a task's completion");
    eprintln!("  rm <task-id>        Delete a task");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
    let tokens = TokenStore::new(cache_dir);
    if let Err(e) = tokens.load().await {
        warn!(error = %e, "Failed to load stored token");
    }

    let api = ApiClient::new(config.api_base_url.clone(), tokens)?
        .with_notifier(Arc::new(CliNotifier))
        .with_navigator(Arc::new(CliNavigator));
    let mut auth = AuthState::new(api.clone(), Arc::new(CliNavigator));

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");

    match command {
        "signup" => {
            let name = prompt("Name")?;
            let email = prompt_with_default("Email", config.last_email.as_deref())?;
            let password = prompt_password()?;

            auth.signup(&name, &email, &password).await?;
            remember_email(&mut config, &email);
        }
        "login" => {
            let email = prompt_with_default("Email", config.last_email.as_deref())?;
            let password = prompt_password()?;

            auth.login(&email, &password).await?;
            remember_email(&mut config, &email);
        }
        "logout" => {
            auth.logout().await;
        }
        "whoami" => {
            let user = api.current_user().await?;
            println!("{} <{}>", user.name, user.email);
            if let Some(bio) = &user.bio {
                println!("{}", bio);
            }
        }
        "list" => {
            let user = api.current_user().await?;
            let tasks = api.get_tasks(&user.id).await?;

            if tasks.is_empty() {
                println!("No tasks yet.");
            }
            for task in &tasks {
                let mark = if task.completed { "x" } else { " " };
                println!(
                    "[{}] #{:<4} {}  ({})",
                    mark,
                    task.id,
                    task.title,
                    task.updated_at.format("%Y-%m-%d")
                );
                if let Some(desc) = &task.description {
                    println!("         {}", desc);
                }
            }
        }
        "add" => {
            let title = args
                .get(2)
                .context("usage: taskflow add <title> [description]")?
                .clone();
            let description = if args.len() > 3 {
                Some(args[3..].join(" "))
            } else {
                None
            };

            let user = api.current_user().await?;
            let task = api
                .create_task(&user.id, &TaskCreate { title, description })
                .await?;
            println!("#{} {}", task.id, task.title);
        }
        "done" => {
            let task_id = parse_task_id(&args, "done")?;
            let user = api.current_user().await?;
            let task = api.toggle_task_completion(&user.id, task_id).await?;
            let state = if task.completed { "done" } else { "open" };
            println!("#{} {} is now {}", task.id, task.title, state);
        }
        "rm" => {
            let task_id = parse_task_id(&args, "rm")?;
            let user = api.current_user().await?;
            api.delete_task(&user.id, task_id).await?;
        }
        _ => usage(),
    }

    Ok(())
}

fn parse_task_id(args: &[String], command: &str) -> Result<i64> {
    args.get(2)
        .with_context(|| format!("usage: taskflow {} <task-id>", command))?
        .parse()
        .context("task id must be a number")
}

fn remember_email(config: &mut Config, email: &str) {
    config.last_email = Some(email.to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_with_default(label: &str, default: Option<&str>) -> Result<String> {
    let Some(default) = default else {
        return prompt(label);
    };

    print!("{} [{}]: ", label, default);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input.to_string())
    }
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}
