use anyhow::Result;
use chrono::Local;
use tasknote_core::recurrence::RecurrenceManager;
use tasknote_core::repository::Repository;

use crate::cli::ShowCommand;
use crate::util::resolve_task;
use crate::views::table::display_task_details;

pub async fn show_task(repo: &impl Repository, command: ShowCommand) -> Result<()> {
    let task = resolve_task(repo, &command.id).await?;

    if command.json {
        println!("{}", serde_json::to_string_pretty(&task)?);
        return Ok(());
    }

    let (next, completed) = if task.is_recurring {
        let today = Local::now().date_naive();
        let next = RecurrenceManager::new(&task)
            .ok()
            .and_then(|manager| {
                if manager.is_occurrence_date(today) {
                    Some(today)
                } else {
                    manager.next_occurrence_after(today)
                }
            });
        let ledger = repo.load_ledger().await?;
        (next, ledger.keys_for_template(&task.id).len())
    } else {
        (None, 0)
    };

    display_task_details(&task, next, completed);
    Ok(())
}
