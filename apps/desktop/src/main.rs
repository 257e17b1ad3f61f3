use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    DeleteOutcome, Directory, DirectoryOptions, DraftField, HttpEmployeeApi, Notification,
    NotificationKind,
};
use shared::domain::RecordId;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;
use render::render_collection;

#[derive(Parser, Debug)]
#[command(name = "directory", about = "Manage the employee directory")]
struct Args {
    /// Employee collection endpoint, e.g. http://127.0.0.1:5000/api/employees
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Config file (defaults to ./directory.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the employee table
    List,
    /// Add a new employee
    Add(FieldArgs),
    /// Edit an existing employee; unspecified fields keep their value
    Edit {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an employee after confirmation
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    employee_id: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone_number: Option<String>,
    #[arg(long)]
    position: Option<String>,
    /// YYYY-MM-DD; defaults to today when adding
    #[arg(long)]
    date_of_joining: Option<String>,
    #[arg(long)]
    salary: Option<String>,
}

impl FieldArgs {
    fn values(self) -> Vec<(DraftField, String)> {
        [
            (DraftField::EmployeeId, self.employee_id),
            (DraftField::Name, self.name),
            (DraftField::Email, self.email),
            (DraftField::PhoneNumber, self.phone_number),
            (DraftField::Position, self.position),
            (DraftField::DateOfJoining, self.date_of_joining),
            (DraftField::Salary, self.salary),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

fn prompt_yes_no(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// Errors are reported once, through the returned `anyhow::Error`.
fn print_success(notification: Option<Notification>) {
    if let Some(n) = notification.filter(|n| n.kind == NotificationKind::Success) {
        println!("{}", n.text);
    }
}

async fn submit_and_report(directory: &Directory) -> Result<()> {
    directory
        .submit_form()
        .await
        .map_err(|err| anyhow!(err.user_message()))?;
    print_success(directory.notification().await);
    println!("{}", render_collection(&directory.collection().await));
    Ok(())
}

async fn fill_form(directory: &Directory, fields: FieldArgs) -> Result<()> {
    for (field, value) in fields.values() {
        directory
            .edit_field(field, value)
            .await
            .with_context(|| format!("failed to set {field}"))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    info!(api = %settings.api_base_url, "directory: starting");

    let api = HttpEmployeeApi::new(&settings.api_base_url, settings.request_timeout())?;
    let directory = Directory::new_with_options(
        Arc::new(api),
        DirectoryOptions {
            dismiss_after: settings.notification_dismiss_after(),
        },
    );

    match args.command {
        Command::List => {
            let _ = directory.load().await;
            println!("{}", render_collection(&directory.collection().await));
        }
        Command::Add(fields) => {
            directory.open_create_form().await;
            fill_form(&directory, fields).await?;
            submit_and_report(&directory).await?;
        }
        Command::Edit { id, fields } => {
            directory
                .load()
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            directory
                .open_edit_form(RecordId(id))
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            fill_form(&directory, fields).await?;
            submit_and_report(&directory).await?;
        }
        Command::Delete { id, yes } => {
            // Best effort: the snapshot only feeds the confirmation prompt.
            let _ = directory.load().await;
            let confirm = |prompt: &str| yes || prompt_yes_no(prompt);
            let outcome = directory
                .delete_employee(RecordId(id), &confirm)
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            match outcome {
                DeleteOutcome::Declined => println!("Nothing deleted."),
                DeleteOutcome::Deleted => {
                    print_success(directory.notification().await);
                    println!("{}", render_collection(&directory.collection().await))
                }
            }
        }
    }

    Ok(())
}
