use anyhow::{anyhow, Context, Result};
use chrono::Local;
use owo_colors::OwoColorize;
use tasknote_core::agenda::{build_agenda, AgendaItem};
use tasknote_core::error::CoreError;
use tasknote_core::models::TaskStatus;
use tasknote_core::repository::Repository;

use crate::cli::ListCommand;
use crate::config::Config;
use crate::parser::parse_date_arg;
use crate::views::table::{display_tasks, ViewTask};

pub async fn list_tasks(
    repo: &impl Repository,
    command: ListCommand,
    config: &Config,
) -> Result<()> {
    let (default_start, default_end) = config.agenda.window_around(Local::now().date_naive());
    let start = command
        .from
        .as_deref()
        .map(parse_date_arg)
        .transpose()?
        .unwrap_or(default_start);
    let end = command
        .to
        .as_deref()
        .map(parse_date_arg)
        .transpose()?
        .unwrap_or(default_end);
    if start > end {
        return Err(anyhow!(CoreError::InvalidInput(format!(
            "--from {} is after --to {}",
            start, end
        ))));
    }

    let status: Option<TaskStatus> = command
        .status
        .as_deref()
        .map(serde_plain::from_str)
        .transpose()
        .context("Invalid --status; use pendente, em-progresso or concluida")?;

    let tasks = repo.list_tasks().await?;
    let ledger = repo.load_ledger().await?;
    let agenda = build_agenda(&tasks, start, end, &ledger);

    let items: Vec<&AgendaItem> = agenda
        .sorted_by_due_date()
        .into_iter()
        .filter(|item| status.map_or(true, |s| item.status() == s))
        .collect();

    if command.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        let view_tasks: Vec<ViewTask> = items.into_iter().map(ViewTask::from).collect();
        display_tasks(&view_tasks);
        println!(
            "{}",
            format!("Showing {} to {}", start, end).bright_black()
        );
    }

    for template_id in &agenda.summary.truncated {
        eprintln!(
            "{} Only the first occurrences of task {} are shown; narrow the window to see the rest",
            "Warning:".yellow().bold(),
            template_id
        );
    }
    for error in &agenda.summary.errors {
        eprintln!("{} {}", "Warning:".yellow().bold(), error);
    }

    Ok(())
}
