use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;
use tasknote_core::error::CoreError;
use tasknote_core::models::{Task, TaskStatus};
use tasknote_core::recurrence::RecurrenceManager;
use tasknote_core::repository::Repository;

use crate::cli::{DoneCommand, UndoCommand};
use crate::parser::parse_date_arg;
use crate::util::{resolve_target, Target};

/// The template and date an occurrence command applies to. Plain tasks come
/// back with no date.
pub(crate) async fn resolve_occurrence(
    repo: &impl Repository,
    id: &str,
    date: Option<&str>,
) -> Result<(Task, Option<NaiveDate>)> {
    match resolve_target(repo, id).await? {
        Target::Occurrence { template, key } => Ok((template, Some(key.date))),
        Target::Task(task) if task.is_recurring => {
            let date = date.map(parse_date_arg).transpose()?;
            Ok((task, date))
        }
        Target::Task(task) => Ok((task, None)),
    }
}

/// Rejects dates the series does not produce (before the anchor, excluded,
/// past the end, or simply not matching the rule).
pub(crate) fn ensure_occurrence(template: &Task, date: NaiveDate) -> Result<()> {
    let manager = RecurrenceManager::new(template)?;
    if manager.is_occurrence_date(date) {
        Ok(())
    } else {
        Err(anyhow!(CoreError::NotAnOccurrence(template.title.clone(), date)))
    }
}

pub async fn done_task(repo: &impl Repository, command: DoneCommand) -> Result<()> {
    let (task, date) = resolve_occurrence(repo, &command.id, command.date.as_deref()).await?;

    if !task.is_recurring {
        let task = repo.set_task_status(&task.id, TaskStatus::Concluida).await?;
        println!("{} Completed task: '{}'", "✓".green().bold(), task.title);
        return Ok(());
    }

    let date = date.unwrap_or_else(|| Local::now().date_naive());
    ensure_occurrence(&task, date)?;

    if repo.mark_occurrence_completed(&task.id, date).await? {
        println!(
            "{} Completed '{}' for {}",
            "✓".green().bold(),
            task.title,
            date.to_string().cyan()
        );
    } else {
        println!("'{}' was already completed for {}", task.title, date);
    }
    Ok(())
}

pub async fn undo_task(repo: &impl Repository, command: UndoCommand) -> Result<()> {
    let (task, date) = resolve_occurrence(repo, &command.id, command.date.as_deref()).await?;

    if !task.is_recurring {
        let task = repo.set_task_status(&task.id, TaskStatus::Pendente).await?;
        println!("Reopened task: '{}'", task.title);
        return Ok(());
    }

    let date = date.ok_or_else(|| {
        anyhow!(CoreError::InvalidInput(
            "Recurring tasks need --date (or an occurrence ID) to undo".to_string()
        ))
    })?;

    if repo.unmark_occurrence_completed(&task.id, date).await? {
        println!("Reopened '{}' for {}", task.title, date.to_string().cyan());
    } else {
        println!("'{}' was not completed for {}", task.title, date);
    }
    Ok(())
}
