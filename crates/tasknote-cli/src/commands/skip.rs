use anyhow::{anyhow, Result};
use owo_colors::OwoColorize;
use tasknote_core::error::CoreError;
use tasknote_core::repository::Repository;

use crate::cli::SkipCommand;
use crate::commands::done::{ensure_occurrence, resolve_occurrence};

pub async fn skip_occurrence(repo: &impl Repository, command: SkipCommand) -> Result<()> {
    let (task, date) = resolve_occurrence(repo, &command.id, command.date.as_deref()).await?;

    if !task.is_recurring {
        return Err(anyhow!(CoreError::NotRecurring(task.title)));
    }
    let date = date.ok_or_else(|| {
        anyhow!(CoreError::InvalidInput(
            "Pass --date (or an occurrence ID) to choose the occurrence to skip".to_string()
        ))
    })?;

    if task.is_excluded(date) {
        println!("'{}' is already skipped on {}", task.title, date);
        return Ok(());
    }
    ensure_occurrence(&task, date)?;

    repo.exclude_occurrence(&task.id, date).await?;
    println!(
        "{} Skipped '{}' on {}",
        "↷".yellow().bold(),
        task.title,
        date.to_string().cyan()
    );
    Ok(())
}
