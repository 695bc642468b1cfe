use crate::dates::{format_date, parse_date, parse_time};
use crate::error::CoreError;
use crate::models::{
    now_timestamp, NewTaskData, RecurringType, Subtask, Task, TaskPriority, TaskStatus, Weekday,
};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, Sqlite, Transaction};
use std::collections::BTreeSet;
use tracing::info;

/// Column layout of the `tasks` table.
#[derive(Debug, FromRow)]
struct TaskRow {
    id: String,
    title: String,
    description: String,
    priority: String,
    status: String,
    due_date: Option<String>,
    due_time: Option<String>,
    created_at: String,
    updated_at: String,
    is_recurring: bool,
    recurring_type: Option<String>,
    recurring_interval: Option<i64>,
    recurring_days: String,
    recurring_end_date: Option<String>,
    recurring_end_count: Option<i64>,
    excluded_dates: String,
    subtasks: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = CoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let invalid = |field: &str, value: &str| {
            CoreError::InvalidInput(format!(
                "Stored task {} has invalid {}: '{}'",
                row.id, field, value
            ))
        };

        let recurring_days: Vec<Weekday> = serde_json::from_str(&row.recurring_days)?;
        let excluded_dates: BTreeSet<NaiveDate> = serde_json::from_str(&row.excluded_dates)?;
        let subtasks: Vec<Subtask> = serde_json::from_str(&row.subtasks)?;

        Ok(Task {
            priority: row
                .priority
                .parse::<TaskPriority>()
                .map_err(|_| invalid("priority", &row.priority))?,
            status: row
                .status
                .parse::<TaskStatus>()
                .map_err(|_| invalid("status", &row.status))?,
            due_date: row.due_date.as_deref().map(parse_date).transpose()?,
            recurring_type: row
                .recurring_type
                .as_deref()
                .map(|t| t.parse::<RecurringType>().map_err(|_| invalid("recurring type", t)))
                .transpose()?,
            recurring_interval: row
                .recurring_interval
                .map(|i| i32::try_from(i).map_err(|_| invalid("interval", &i.to_string())))
                .transpose()?,
            recurring_end_date: row.recurring_end_date.as_deref().map(parse_date).transpose()?,
            recurring_end_count: row
                .recurring_end_count
                .map(|c| u32::try_from(c).map_err(|_| invalid("end count", &c.to_string())))
                .transpose()?,
            recurring_days,
            excluded_dates,
            subtasks,
            id: row.id,
            title: row.title,
            description: row.description,
            due_time: row.due_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_recurring: row.is_recurring,
        })
    }
}

impl SqliteRepository {
    async fn save_task_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        task: &Task,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO tasks (
                id, title, description, priority, status, due_date, due_time,
                created_at, updated_at, is_recurring, recurring_type, recurring_interval,
                recurring_days, recurring_end_date, recurring_end_count, excluded_dates, subtasks
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"#,
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.to_string())
        .bind(task.status.to_string())
        .bind(task.due_date.map(format_date))
        .bind(&task.due_time)
        .bind(&task.created_at)
        .bind(&task.updated_at)
        .bind(task.is_recurring)
        .bind(task.recurring_type.map(|t| t.to_string()))
        .bind(task.recurring_interval.map(i64::from))
        .bind(serde_json::to_string(&task.recurring_days)?)
        .bind(task.recurring_end_date.map(format_date))
        .bind(task.recurring_end_count.map(i64::from))
        .bind(serde_json::to_string(&task.excluded_dates)?)
        .bind(serde_json::to_string(&task.subtasks)?)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn find_task_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        id: &str,
    ) -> Result<Task, CoreError> {
        let row: TaskRow = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        Task::try_from(row)
    }

    /// Loads a task, applies `change`, bumps `updated_at` and writes it back
    /// in one transaction.
    async fn modify_task<F>(&self, id: &str, change: F) -> Result<Task, CoreError>
    where
        F: FnOnce(&mut Task) -> Result<(), CoreError> + Send,
    {
        let mut tx = self.pool().begin().await?;
        let mut task = Self::find_task_in_transaction(&mut tx, id).await?;
        change(&mut task)?;
        task.updated_at = now_timestamp();
        Self::save_task_in_transaction(&mut tx, &task).await?;
        tx.commit().await?;
        Ok(task)
    }
}

fn validate_new_task(data: &NewTaskData) -> Result<(), CoreError> {
    if data.title.trim().is_empty() {
        return Err(CoreError::InvalidInput("Task title cannot be empty".to_string()));
    }
    if let Some(time) = &data.due_time {
        parse_time(time)?;
    }
    if let Some(recurrence) = &data.recurrence {
        if recurrence.recurring_type.is_none() {
            return Err(CoreError::InvalidInput(
                "Recurring tasks need a recurrence type".to_string(),
            ));
        }
        if let (Some(end), Some(due)) = (recurrence.end_date, data.due_date) {
            if end < due {
                return Err(CoreError::InvalidInput(format!(
                    "Recurrence end date {} is before the due date {}",
                    end, due
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl super::TaskRepository for SqliteRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        validate_new_task(&data)?;
        let task = data.into_task();

        let mut tx = self.pool().begin().await?;
        Self::save_task_in_transaction(&mut tx, &task).await?;
        tx.commit().await?;

        info!(task_id = %task.id, recurring = task.is_recurring, "task added");
        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;
        Self::save_task_in_transaction(&mut tx, task).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_task_by_id(&self, id: &str) -> Result<Option<Task>, CoreError> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn find_tasks_by_id_prefix(&self, prefix: &str) -> Result<Vec<Task>, CoreError> {
        let mut pattern = String::with_capacity(prefix.len() + 1);
        for c in prefix.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');

        let rows: Vec<TaskRow> =
            sqlx::query_as(r"SELECT * FROM tasks WHERE id LIKE $1 ESCAPE '\' ORDER BY id")
                .bind(pattern)
                .fetch_all(self.pool())
                .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, CoreError> {
        let rows: Vec<TaskRow> = sqlx::query_as("SELECT * FROM tasks ORDER BY created_at, id")
            .fetch_all(self.pool())
            .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn delete_task(&self, id: &str) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }

        let ledger_rows = sqlx::query("DELETE FROM completed_occurrences WHERE template_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        info!(task_id = id, ledger_rows, "task deleted");
        Ok(())
    }

    async fn set_task_status(&self, id: &str, status: TaskStatus) -> Result<Task, CoreError> {
        self.modify_task(id, |task| {
            if task.is_recurring {
                return Err(CoreError::InvalidInput(format!(
                    "Task '{}' is recurring; complete a specific occurrence instead",
                    task.title
                )));
            }
            task.status = status;
            Ok(())
        })
        .await
    }

    async fn exclude_occurrence(&self, id: &str, date: NaiveDate) -> Result<Task, CoreError> {
        self.modify_task(id, |task| {
            if !task.is_recurring {
                return Err(CoreError::NotRecurring(task.id.clone()));
            }
            task.excluded_dates.insert(date);
            Ok(())
        })
        .await
    }

    async fn add_subtask(&self, id: &str, title: String) -> Result<Task, CoreError> {
        if title.trim().is_empty() {
            return Err(CoreError::InvalidInput("Subtask title cannot be empty".to_string()));
        }
        self.modify_task(id, |task| {
            task.subtasks.push(Subtask::new(title));
            Ok(())
        })
        .await
    }
}
