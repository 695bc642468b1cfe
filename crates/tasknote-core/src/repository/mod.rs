use crate::db::DbPool;
use crate::error::CoreError;
use crate::ledger::CompletionLedger;
use crate::models::{NewTaskData, Task, TaskStatus};
use async_trait::async_trait;
use chrono::NaiveDate;

pub mod ledger;
pub mod tasks;

/// Domain-specific trait for task records
#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    /// Inserts or replaces a complete record, e.g. one imported from another store.
    async fn save_task(&self, task: &Task) -> Result<(), CoreError>;
    async fn find_task_by_id(&self, id: &str) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_id_prefix(&self, prefix: &str) -> Result<Vec<Task>, CoreError>;
    async fn list_tasks(&self) -> Result<Vec<Task>, CoreError>;
    /// Removes the task and every completion recorded for its occurrences.
    async fn delete_task(&self, id: &str) -> Result<(), CoreError>;
    /// Sets the status of a one-off task. Occurrences of recurring tasks are
    /// completed through the ledger instead.
    async fn set_task_status(&self, id: &str, status: TaskStatus) -> Result<Task, CoreError>;
    /// Suppresses the single occurrence of a recurring task on `date`.
    async fn exclude_occurrence(&self, id: &str, date: NaiveDate) -> Result<Task, CoreError>;
    async fn add_subtask(&self, id: &str, title: String) -> Result<Task, CoreError>;
}

/// Domain-specific trait for the completion ledger of one owner
#[async_trait]
pub trait LedgerRepository {
    async fn load_ledger(&self) -> Result<CompletionLedger, CoreError>;
    /// Returns `false` when the occurrence was already marked.
    async fn mark_occurrence_completed(
        &self,
        template_id: &str,
        date: NaiveDate,
    ) -> Result<bool, CoreError>;
    /// Returns `false` when the occurrence was not marked.
    async fn unmark_occurrence_completed(
        &self,
        template_id: &str,
        date: NaiveDate,
    ) -> Result<bool, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository: TaskRepository + LedgerRepository + Send + Sync {}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    owner: String,
}

impl SqliteRepository {
    /// `owner` scopes the completion ledger.
    pub fn new(pool: DbPool, owner: impl Into<String>) -> Self {
        Self {
            pool,
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl Repository for SqliteRepository {}
