//! Expansion of a whole task collection for one date window.
//!
//! This is the control flow list, kanban and calendar views share: one-off
//! tasks pass through, each recurring template is expanded separately, and a
//! template that cannot be expanded is reported and skipped without taking
//! the others down with it.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::ledger::CompletionLedger;
use crate::models::{Task, TaskStatus};
use crate::occurrence::TaskOccurrence;
use crate::recurrence::RecurrenceManager;

/// A row of the agenda.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgendaItem {
    Single(Task),
    Occurrence(TaskOccurrence),
}

impl AgendaItem {
    pub fn task(&self) -> &Task {
        match self {
            AgendaItem::Single(task) => task,
            AgendaItem::Occurrence(occurrence) => occurrence.task(),
        }
    }

    pub fn id(&self) -> &str {
        &self.task().id
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.task().due_date
    }

    pub fn status(&self) -> TaskStatus {
        self.task().status
    }

    /// The template id for occurrences, `None` for one-off tasks.
    pub fn template_id(&self) -> Option<&str> {
        match self {
            AgendaItem::Single(_) => None,
            AgendaItem::Occurrence(occurrence) => Some(occurrence.template_id()),
        }
    }
}

/// Statistics collected while building an agenda.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgendaSummary {
    /// Recurring templates expanded successfully
    pub templates_expanded: usize,
    /// Occurrences generated across all templates
    pub occurrences_generated: usize,
    /// Recurring templates that could not be expanded
    pub templates_skipped: usize,
    /// Templates whose expansion hit the per-call cap
    pub truncated: Vec<String>,
    /// One message per skipped template
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Agenda {
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub items: Vec<AgendaItem>,
    pub summary: AgendaSummary,
}

impl Agenda {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Items ordered by due date, undated tasks last. Stable, so items on
    /// the same day keep their input order.
    pub fn sorted_by_due_date(&self) -> Vec<&AgendaItem> {
        let mut items: Vec<&AgendaItem> = self.items.iter().collect();
        items.sort_by_key(|item| (item.due_date().is_none(), item.due_date()));
        items
    }
}

/// Expands `tasks` over `[window_start, window_end]`.
///
/// Items appear in input order: a one-off task as itself, a recurring
/// template as its occurrences in date order.
pub fn build_agenda(
    tasks: &[Task],
    window_start: NaiveDate,
    window_end: NaiveDate,
    ledger: &CompletionLedger,
) -> Agenda {
    let mut items = Vec::with_capacity(tasks.len());
    let mut summary = AgendaSummary::default();

    for task in tasks {
        if !task.is_recurring {
            items.push(AgendaItem::Single(task.clone()));
            continue;
        }

        match RecurrenceManager::new(task) {
            Ok(manager) => {
                let expansion = manager.expand_between(window_start, window_end, ledger);
                summary.templates_expanded += 1;
                summary.occurrences_generated += expansion.occurrences.len();
                if expansion.truncated {
                    summary.truncated.push(task.id.clone());
                }
                items.extend(expansion.occurrences.into_iter().map(AgendaItem::Occurrence));
            }
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "skipping recurring task in agenda");
                summary.templates_skipped += 1;
                summary.errors.push(e.to_string());
            }
        }
    }

    debug!(
        items = items.len(),
        expanded = summary.templates_expanded,
        skipped = summary.templates_skipped,
        "built agenda"
    );

    Agenda {
        window_start: Some(window_start),
        window_end: Some(window_end),
        items,
        summary,
    }
}

/// Default agenda window around "today".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AgendaConfig {
    /// Days after today included in the window
    pub lookahead_days: u32,
    /// Days before today included in the window
    pub grace_days: u32,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            lookahead_days: 30,
            grace_days: 3,
        }
    }
}

impl AgendaConfig {
    /// `(today - grace_days, today + lookahead_days)`, clamped to the
    /// representable date range.
    pub fn window_around(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today
            .checked_sub_days(Days::new(u64::from(self.grace_days)))
            .unwrap_or(NaiveDate::MIN);
        let end = today
            .checked_add_days(Days::new(u64::from(self.lookahead_days)))
            .unwrap_or(NaiveDate::MAX);
        (start, end)
    }
}
