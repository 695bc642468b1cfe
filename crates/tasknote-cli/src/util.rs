use anyhow::{anyhow, Result};
use tasknote_core::error::CoreError;
use tasknote_core::models::Task;
use tasknote_core::occurrence::OccurrenceKey;
use tasknote_core::repository::Repository;

/// What a user-supplied id refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Task(Task),
    /// A single occurrence, addressed as `{templateId}_occurrence_{date}`.
    Occurrence { template: Task, key: OccurrenceKey },
}

/// Resolves a full id, an id prefix or an occurrence id.
pub async fn resolve_target(repo: &impl Repository, input: &str) -> Result<Target> {
    if let Some(key) = OccurrenceKey::parse_occurrence_id(input) {
        let template = resolve_task(repo, &key.template_id).await?;
        let key = OccurrenceKey::new(template.id.as_str(), key.date);
        return Ok(Target::Occurrence { template, key });
    }
    Ok(Target::Task(resolve_task(repo, input).await?))
}

/// Finds a task by exact id, falling back to a unique id prefix.
pub async fn resolve_task(repo: &impl Repository, short_id: &str) -> Result<Task> {
    if let Some(task) = repo.find_task_by_id(short_id).await? {
        return Ok(task);
    }
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let mut tasks = repo.find_tasks_by_id_prefix(short_id).await?;
    match tasks.len() {
        1 => Ok(tasks.remove(0)),
        0 => Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        )))),
        _ => {
            let task_info: Vec<(String, String)> =
                tasks.into_iter().map(|t| (t.id, t.title)).collect();
            Err(anyhow!(CoreError::AmbiguousId(task_info)))
        }
    }
}

/// First eight characters of an id, enough to be typed back.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
