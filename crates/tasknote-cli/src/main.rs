use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tasknote_core::db;
use tasknote_core::error::CoreError;
use tasknote_core::repository::SqliteRepository;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tasknote=warn".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = cli::Cli::parse();

    let config = config::Config::new().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring invalid configuration");
        config::Config::default()
    });
    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let repository = SqliteRepository::new(db_pool, config.owner.clone());

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&repository, command).await,
        cli::Commands::List(command) => {
            commands::list::list_tasks(&repository, command, &config).await
        }
        cli::Commands::Done(command) => commands::done::done_task(&repository, command).await,
        cli::Commands::Undo(command) => commands::done::undo_task(&repository, command).await,
        cli::Commands::Skip(command) => {
            commands::skip::skip_occurrence(&repository, command).await
        }
        cli::Commands::Preview(command) => {
            commands::preview::preview_task(&repository, command).await
        }
        cli::Commands::Show(command) => commands::show::show_task(&repository, command).await,
        cli::Commands::Delete(command) => {
            commands::delete::delete_task(&repository, command).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in tasks {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::NotRecurring(title) => {
                eprintln!(
                    "{} Task '{}' is not recurring",
                    "Error:".style(error_style),
                    title.yellow()
                );
            }
            CoreError::NotAnOccurrence(title, date) => {
                eprintln!(
                    "{} '{}' has no occurrence on {}",
                    "Error:".style(error_style),
                    title.yellow(),
                    date
                );
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
