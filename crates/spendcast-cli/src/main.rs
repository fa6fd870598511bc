use clap::Parser;
use owo_colors::{OwoColorize, Style};
use spendcast_core::db;
use spendcast_core::error::CoreError;
use spendcast_core::recurrence::RecurrenceResolver;
use spendcast_core::regeneration::SeriesRegenerator;
use spendcast_core::repository::SqliteRepository;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

const LOG_ENV: &str = "SPENDCAST_LOG";

#[tokio::main]
async fn main() {
    init_logging();

    let cli = cli::Cli::parse();
    if let Err(e) = run(cli).await {
        handle_error(e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let mut config = config::Config::new().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable configuration");
        config::Config::default()
    });
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(timezone) = cli.timezone {
        config.timezone = Some(timezone);
    }

    let calendar = config.calendar()?;
    let resolver = RecurrenceResolver::new(calendar);
    tracing::debug!(timezone = calendar.name(), db = %config.database_path, "starting");

    // Preview is pure and never touches the database
    if let cli::Commands::Preview(command) = cli.command {
        return commands::preview::preview(&resolver, command);
    }

    let db_pool = db::establish_connection(&config.database_path).await?;
    let repository = SqliteRepository::new(db_pool, SeriesRegenerator::new(resolver));

    match cli.command {
        cli::Commands::Income(command) => {
            commands::income::income_command(&repository, &calendar, command).await
        }
        cli::Commands::Expense(command) => {
            commands::expense::expense_command(&repository, &calendar, command).await
        }
        cli::Commands::Project(command) => {
            commands::project::project_command(&repository, &config, command).await
        }
        cli::Commands::Preview(command) => commands::preview::preview(&resolver, command),
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.chain().find_map(|e| e.downcast_ref::<CoreError>()) {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(records) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, name) in records {
                    eprintln!("  {} ({})", id.yellow(), name);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidRecurrence(s) => {
                eprintln!("{} Invalid recurrence: {}", "Error:".style(error_style), s);
                eprintln!(
                    "Use one of: daily, weekly, biweekly, semimonthly, monthly, quarterly, yearly, or a rule like {}",
                    "FREQ=MONTHLY;BYMONTHDAY=1,15".yellow()
                );
            }
            CoreError::InvalidTimezone(s) => {
                eprintln!("{} Invalid timezone: '{}'", "Error:".style(error_style), s.yellow());
                eprintln!("Did you mean one of these?");
                for suggestion in config::suggest_timezone(s) {
                    eprintln!("  {}", suggestion);
                }
            }
            CoreError::Database(e) => {
                eprintln!("{} Database error: {}", "Error:".style(error_style), e);
            }
            CoreError::Migration(e) => {
                eprintln!("{} Database migration failed: {}", "Error:".style(error_style), e);
            }
            CoreError::Io(e) => {
                eprintln!("{} {}", "Error:".style(error_style), e);
            }
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
