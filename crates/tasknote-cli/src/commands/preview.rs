use anyhow::Result;
use chrono::Local;
use tasknote_core::recurrence::{RecurrenceManager, MAX_OCCURRENCES_PER_CALL};
use tasknote_core::repository::Repository;

use crate::cli::PreviewCommand;
use crate::parser::parse_date_arg;
use crate::util::resolve_task;
use crate::views::table::{describe_recurrence, display_tasks, ViewTask};

pub async fn preview_task(repo: &impl Repository, command: PreviewCommand) -> Result<()> {
    let task = resolve_task(repo, &command.id).await?;
    let manager = RecurrenceManager::new(&task)?;
    let from = command
        .from
        .as_deref()
        .map(parse_date_arg)
        .transpose()?
        .unwrap_or_else(|| Local::now().date_naive());

    let ledger = repo.load_ledger().await?;
    let occurrences = manager.preview_occurrences(from, command.count, &ledger);

    println!("{} ({})", task.title, describe_recurrence(&task));
    let view_tasks: Vec<ViewTask> = occurrences.iter().map(ViewTask::from).collect();
    display_tasks(&view_tasks);
    if command.count > MAX_OCCURRENCES_PER_CALL {
        eprintln!("Showing at most {} occurrences.", MAX_OCCURRENCES_PER_CALL);
    }
    Ok(())
}
