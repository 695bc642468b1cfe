//! Occurrence identity and the occurrence record itself.
//!
//! Occurrence ids and completion-ledger keys are stored as strings built
//! around an `_occurrence_` delimiter:
//!
//! - occurrence id: `{templateId}_occurrence_{YYYY-MM-DD}`
//! - ledger key:    `{templateId}_occurrence_{YYYY-MM-DD}_{YYYY-MM-DD}`
//!
//! The date appearing twice in the ledger key is the stored format and must
//! be kept for existing data to keep matching. [`OccurrenceKey`] is the only
//! place that builds or parses these strings. Parsing works from the right,
//! so template ids that themselves contain underscores (or even the word
//! `occurrence`) round-trip.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::dates::{format_date, parse_date, to_local_datetime};
use crate::models::{Task, TaskStatus};

const OCCURRENCE_MARKER: &str = "_occurrence_";
/// Length of a `YYYY-MM-DD` date.
const DATE_LEN: usize = 10;

/// Identity of one occurrence: which template, which calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceKey {
    pub template_id: String,
    pub date: NaiveDate,
}

impl OccurrenceKey {
    pub fn new(template_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            template_id: template_id.into(),
            date,
        }
    }

    /// `{templateId}_occurrence_{date}`
    pub fn occurrence_id(&self) -> String {
        format!("{}{}{}", self.template_id, OCCURRENCE_MARKER, format_date(self.date))
    }

    /// `{occurrenceId}_{date}`, the form stored in the completion ledger.
    pub fn ledger_key(&self) -> String {
        format!("{}_{}", self.occurrence_id(), format_date(self.date))
    }

    /// Parses an occurrence id back into its parts.
    pub fn parse_occurrence_id(id: &str) -> Option<Self> {
        let (head, date) = split_trailing_date(id)?;
        let template_id = head.strip_suffix(OCCURRENCE_MARKER)?;
        if template_id.is_empty() {
            return None;
        }
        Some(Self::new(template_id, date))
    }

    /// Parses a ledger key. Both embedded dates must agree.
    pub fn parse_ledger_key(key: &str) -> Option<Self> {
        let (head, date) = split_trailing_date(key)?;
        let occurrence_id = head.strip_suffix('_')?;
        let parsed = Self::parse_occurrence_id(occurrence_id)?;
        (parsed.date == date).then_some(parsed)
    }
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.occurrence_id())
    }
}

fn split_trailing_date(value: &str) -> Option<(&str, NaiveDate)> {
    let split = value.len().checked_sub(DATE_LEN)?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    let date = parse_date(tail).ok()?;
    Some((head, date))
}

/// One concrete, dated instance of a recurring task. Never persisted.
///
/// The wrapped [`Task`] is a copy of the template with `id`, `due_date`,
/// `is_recurring` and `status` overridden, and serializes exactly like a task
/// record. It is a separate type so an occurrence cannot be fed back into the
/// recurrence engine as if it were a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOccurrence {
    #[serde(skip)]
    key: OccurrenceKey,
    #[serde(flatten)]
    task: Task,
}

impl TaskOccurrence {
    /// Materializes the occurrence of `template` on `date`.
    pub(crate) fn from_template(template: &Task, date: NaiveDate, completed: bool) -> Self {
        let key = OccurrenceKey::new(template.id.clone(), date);
        let mut task = template.clone();
        task.id = key.occurrence_id();
        task.due_date = Some(date);
        task.is_recurring = false;
        if completed {
            task.status = TaskStatus::Concluida;
        }
        Self { key, task }
    }

    pub fn key(&self) -> &OccurrenceKey {
        &self.key
    }

    pub fn id(&self) -> &str {
        &self.task.id
    }

    pub fn template_id(&self) -> &str {
        &self.key.template_id
    }

    pub fn date(&self) -> NaiveDate {
        self.key.date
    }

    pub fn status(&self) -> TaskStatus {
        self.task.status
    }

    pub fn is_completed(&self) -> bool {
        self.task.status == TaskStatus::Concluida
    }

    pub fn ledger_key(&self) -> String {
        self.key.ledger_key()
    }

    /// Date and `dueTime` combined, for display.
    pub fn due_at_local(&self) -> chrono::NaiveDateTime {
        to_local_datetime(self.key.date, self.task.due_time.as_deref())
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn into_task(self) -> Task {
        self.task
    }
}
