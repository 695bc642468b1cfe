use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Task '{0}' is not recurring")]
    NotRecurring(String),

    #[error("Recurring task '{0}' has no recurrence type")]
    MissingRecurrenceType(String),

    #[error("Recurring task '{0}' has no usable anchor date")]
    InvalidAnchor(String),

    #[error("Occurrence date {1} is not part of the series for task '{0}'")]
    NotAnOccurrence(String, NaiveDate),

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, Title)
}
