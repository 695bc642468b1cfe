use anyhow::Result;
use dialoguer::Confirm;
use tasknote_core::repository::Repository;

use crate::cli::DeleteCommand;
use crate::util::resolve_task;

pub async fn delete_task(repo: &impl Repository, command: DeleteCommand) -> Result<()> {
    let task = resolve_task(repo, &command.id).await?;

    if !command.force {
        let prompt = if task.is_recurring {
            format!(
                "Delete recurring task '{}' and all of its completion history?",
                task.title
            )
        } else {
            format!("Are you sure you want to delete task '{}'?", task.title)
        };
        let confirmation = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_task(&task.id).await?;
    println!("Deleted task: '{}'", task.title);
    Ok(())
}
