use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, warn};

use crate::dates::{days_between, resolve_anchor};
use crate::error::CoreError;
use crate::ledger::CompletionLedger;
use crate::models::{RecurringType, Task, Weekday};
use crate::occurrence::{OccurrenceKey, TaskOccurrence};

/// Upper bound on occurrences produced by a single expansion, whatever the
/// window or end conditions.
pub const MAX_OCCURRENCES_PER_CALL: usize = 100;

/// How far ahead previews look for the requested number of occurrences.
pub const PREVIEW_HORIZON_DAYS: u64 = 3660;

/// Result of expanding one template over a window.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub occurrences: Vec<TaskOccurrence>,
    /// The window holds more occurrences than the per-call cap let through.
    pub truncated: bool,
}

/// RecurrenceManager: occurrence calculation for one recurring task.
///
/// Responsibilities:
/// 1. Validate that the task is a usable template (recurring, typed, anchored)
/// 2. Decide per calendar day whether the rule produces an occurrence
/// 3. Enumerate occurrences in a window, applying exclusions and end conditions
/// 4. Merge completion state from a ledger snapshot
///
/// Enumeration walks forward one calendar day at a time from the anchor (or
/// the window start, whichever is later) and asks the per-type predicate
/// about each day. It never jumps ahead to the "next" matching date, so
/// monthly and yearly rules need no month-length arithmetic.
#[derive(Debug)]
pub struct RecurrenceManager<'a> {
    template: &'a Task,
    recurring_type: RecurringType,
    anchor: NaiveDate,
}

impl<'a> RecurrenceManager<'a> {
    /// Creates a manager for `template`.
    ///
    /// # Errors
    /// - `NotRecurring` when `is_recurring` is false
    /// - `MissingRecurrenceType` when no `recurring_type` is set
    /// - `InvalidAnchor` when there is no due date and `created_at` does not parse
    pub fn new(template: &'a Task) -> Result<Self, CoreError> {
        if !template.is_recurring {
            return Err(CoreError::NotRecurring(template.id.clone()));
        }
        let recurring_type = template
            .recurring_type
            .ok_or_else(|| CoreError::MissingRecurrenceType(template.id.clone()))?;
        let anchor = resolve_anchor(template)
            .ok_or_else(|| CoreError::InvalidAnchor(template.id.clone()))?;

        Ok(Self {
            template,
            recurring_type,
            anchor,
        })
    }

    pub fn template(&self) -> &Task {
        self.template
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn recurring_type(&self) -> RecurringType {
        self.recurring_type
    }

    /// Whether the rule itself selects `date`. Ignores the anchor lower bound,
    /// exclusions and end conditions; those belong to the scan.
    pub fn should_create_occurrence(&self, date: NaiveDate) -> bool {
        let template = self.template;
        match self.recurring_type {
            RecurringType::Daily => true,
            RecurringType::Weekly if !template.recurring_days.is_empty() => {
                template.recurring_days.contains(&Weekday::from(date.weekday()))
            }
            RecurringType::Weekly => {
                let step = 7 * template.effective_interval();
                days_between(self.anchor, date).rem_euclid(step) == 0
            }
            RecurringType::Monthly => date.day() == self.anchor.day(),
            RecurringType::Yearly => {
                date.day() == self.anchor.day() && date.month() == self.anchor.month()
            }
            RecurringType::Custom => {
                days_between(self.anchor, date).rem_euclid(template.effective_interval()) == 0
            }
        }
    }

    /// Occurrences falling in `[start, end]` (inclusive), in date order,
    /// capped at [`MAX_OCCURRENCES_PER_CALL`].
    pub fn generate_occurrences_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        ledger: &CompletionLedger,
    ) -> Vec<TaskOccurrence> {
        self.expand_between(start, end, ledger).occurrences
    }

    /// Like [`generate_occurrences_between`](Self::generate_occurrences_between),
    /// also reporting whether the cap cut the window short.
    pub fn expand_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        ledger: &CompletionLedger,
    ) -> Expansion {
        self.scan(start, end, MAX_OCCURRENCES_PER_CALL, ledger)
    }

    /// The first `count` occurrences on or after `from`, looking at most
    /// [`PREVIEW_HORIZON_DAYS`] ahead.
    pub fn preview_occurrences(
        &self,
        from: NaiveDate,
        count: usize,
        ledger: &CompletionLedger,
    ) -> Vec<TaskOccurrence> {
        let horizon = from
            .checked_add_days(Days::new(PREVIEW_HORIZON_DAYS))
            .unwrap_or(NaiveDate::MAX);
        let limit = count.min(MAX_OCCURRENCES_PER_CALL);
        self.scan(from, horizon, limit, ledger).occurrences
    }

    /// The first occurrence date strictly after `after`, or `None` when the
    /// series has ended (or nothing falls within the preview horizon).
    pub fn next_occurrence_after(&self, after: NaiveDate) -> Option<NaiveDate> {
        let from = after.succ_opt()?;
        self.preview_occurrences(from, 1, &CompletionLedger::new())
            .first()
            .map(TaskOccurrence::date)
    }

    /// Whether `date` produces an occurrence once every rule is applied.
    pub fn is_occurrence_date(&self, date: NaiveDate) -> bool {
        !self
            .scan(date, date, 1, &CompletionLedger::new())
            .occurrences
            .is_empty()
    }

    /// Day-by-day walk shared by every public enumeration.
    ///
    /// The end-count budget covers the whole timeline from the anchor, so
    /// when one is set the walk starts at the anchor and counts (without
    /// emitting) the occurrences that precede the window. Excluded dates do
    /// not consume budget.
    fn scan(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
        limit: usize,
        ledger: &CompletionLedger,
    ) -> Expansion {
        let template = self.template;
        let mut current = if template.recurring_end_count.is_some() {
            self.anchor
        } else {
            self.anchor.max(window_start)
        };

        let mut occurrences = Vec::new();
        let mut counted: u32 = 0;
        let mut truncated = false;

        while current <= window_end {
            if let Some(end_date) = template.recurring_end_date {
                if current > end_date {
                    break;
                }
            }
            if let Some(end_count) = template.recurring_end_count {
                if counted >= end_count {
                    break;
                }
            }

            if self.should_create_occurrence(current) && !template.is_excluded(current) {
                if current >= window_start {
                    // Only another real occurrence past the cap counts as truncation.
                    if occurrences.len() >= limit {
                        truncated = true;
                        break;
                    }
                    let key = OccurrenceKey::new(template.id.as_str(), current);
                    let completed = ledger.is_completed(&key);
                    occurrences.push(TaskOccurrence::from_template(template, current, completed));
                }
                counted += 1;
            }

            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        debug!(
            template_id = %template.id,
            %window_start,
            %window_end,
            generated = occurrences.len(),
            truncated,
            "expanded recurring task"
        );

        Expansion {
            occurrences,
            truncated,
        }
    }
}

/// Occurrences of `template` in `[start, end]`, merged with `ledger`.
///
/// Never fails: a non-recurring task, or a template that cannot be expanded
/// (no recurrence type, no usable anchor), yields an empty list.
pub fn generate_occurrences(
    template: &Task,
    start: NaiveDate,
    end: NaiveDate,
    ledger: &CompletionLedger,
) -> Vec<TaskOccurrence> {
    match RecurrenceManager::new(template) {
        Ok(manager) => manager.generate_occurrences_between(start, end, ledger),
        Err(CoreError::NotRecurring(_)) => Vec::new(),
        Err(e) => {
            warn!(template_id = %template.id, error = %e, "skipping recurring task");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(recurring_type: RecurringType, anchor: NaiveDate) -> Task {
        Task {
            id: "t1".to_string(),
            title: "Recurring".to_string(),
            is_recurring: true,
            recurring_type: Some(recurring_type),
            due_date: Some(anchor),
            ..Default::default()
        }
    }

    fn expand(task: &Task, start: NaiveDate, end: NaiveDate) -> Vec<TaskOccurrence> {
        generate_occurrences(task, start, end, &CompletionLedger::new())
    }

    fn dates(occurrences: &[TaskOccurrence]) -> Vec<NaiveDate> {
        occurrences.iter().map(TaskOccurrence::date).collect()
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn test_new_success() {
            let task = template(RecurringType::Daily, ymd(2024, 1, 1));
            let manager = RecurrenceManager::new(&task).unwrap();
            assert_eq!(manager.anchor(), ymd(2024, 1, 1));
            assert_eq!(manager.recurring_type(), RecurringType::Daily);
        }

        #[test]
        fn test_new_not_recurring() {
            let mut task = template(RecurringType::Daily, ymd(2024, 1, 1));
            task.is_recurring = false;
            assert!(matches!(RecurrenceManager::new(&task), Err(CoreError::NotRecurring(_))));
        }

        #[test]
        fn test_new_missing_type() {
            let mut task = template(RecurringType::Daily, ymd(2024, 1, 1));
            task.recurring_type = None;
            assert!(matches!(
                RecurrenceManager::new(&task),
                Err(CoreError::MissingRecurrenceType(_))
            ));
        }

        #[test]
        fn test_new_invalid_anchor() {
            let mut task = template(RecurringType::Daily, ymd(2024, 1, 1));
            task.due_date = None;
            task.created_at = "garbage".to_string();
            assert!(matches!(RecurrenceManager::new(&task), Err(CoreError::InvalidAnchor(_))));
            assert!(expand(&task, ymd(2024, 1, 1), ymd(2024, 1, 31)).is_empty());
        }

        #[test]
        fn test_created_at_anchor() {
            let mut task = template(RecurringType::Daily, ymd(2024, 1, 1));
            task.due_date = None;
            task.created_at = "2024-01-03T09:00:00".to_string();
            let occurrences = expand(&task, ymd(2024, 1, 1), ymd(2024, 1, 5));
            assert_eq!(
                dates(&occurrences),
                vec![ymd(2024, 1, 3), ymd(2024, 1, 4), ymd(2024, 1, 5)]
            );
        }
    }

    mod predicate_tests {
        use super::*;

        #[test]
        fn test_weekly_without_days_uses_interval() {
            let mut task = template(RecurringType::Weekly, ymd(2024, 1, 1));
            task.recurring_interval = Some(2);
            let manager = RecurrenceManager::new(&task).unwrap();
            assert!(manager.should_create_occurrence(ymd(2024, 1, 1)));
            assert!(!manager.should_create_occurrence(ymd(2024, 1, 8)));
            assert!(manager.should_create_occurrence(ymd(2024, 1, 15)));
        }

        #[test]
        fn test_weekly_with_days_ignores_anchor_weekday() {
            let mut task = template(RecurringType::Weekly, ymd(2024, 1, 3));
            task.recurring_days = vec![Weekday::Friday];
            let manager = RecurrenceManager::new(&task).unwrap();
            assert!(manager.should_create_occurrence(ymd(2024, 1, 5)));
            assert!(!manager.should_create_occurrence(ymd(2024, 1, 3)));
        }

        #[test]
        fn test_monthly_skips_short_months() {
            let task = template(RecurringType::Monthly, ymd(2024, 1, 31));
            let occurrences = expand(&task, ymd(2024, 1, 1), ymd(2024, 6, 30));
            assert_eq!(
                dates(&occurrences),
                vec![ymd(2024, 1, 31), ymd(2024, 3, 31), ymd(2024, 5, 31)]
            );
        }

        #[test]
        fn test_yearly_leap_day() {
            let task = template(RecurringType::Yearly, ymd(2024, 2, 29));
            let manager = RecurrenceManager::new(&task).unwrap();
            assert_eq!(manager.next_occurrence_after(ymd(2024, 2, 29)), Some(ymd(2028, 2, 29)));
        }

        #[test]
        fn test_custom_interval_clamped() {
            let mut task = template(RecurringType::Custom, ymd(2024, 1, 1));
            task.recurring_interval = Some(0);
            let occurrences = expand(&task, ymd(2024, 1, 1), ymd(2024, 1, 3));
            assert_eq!(occurrences.len(), 3);

            task.recurring_interval = Some(3);
            let occurrences = expand(&task, ymd(2024, 1, 1), ymd(2024, 1, 10));
            assert_eq!(
                dates(&occurrences),
                vec![ymd(2024, 1, 1), ymd(2024, 1, 4), ymd(2024, 1, 7), ymd(2024, 1, 10)]
            );
        }
    }

    mod scan_tests {
        use super::*;

        #[test]
        fn test_window_before_anchor() {
            let task = template(RecurringType::Daily, ymd(2024, 2, 1));
            let occurrences = expand(&task, ymd(2024, 1, 1), ymd(2024, 1, 31));
            assert!(occurrences.is_empty());
        }

        #[test]
        fn test_inverted_window_is_empty() {
            let task = template(RecurringType::Daily, ymd(2024, 1, 1));
            let occurrences = expand(&task, ymd(2024, 1, 10), ymd(2024, 1, 1));
            assert!(occurrences.is_empty());
        }

        #[test]
        fn test_end_count_counts_from_anchor() {
            let mut task = template(RecurringType::Daily, ymd(2024, 1, 1));
            task.recurring_end_count = Some(3);
            let occurrences = expand(&task, ymd(2024, 1, 2), ymd(2024, 1, 31));
            assert_eq!(dates(&occurrences), vec![ymd(2024, 1, 2), ymd(2024, 1, 3)]);
        }

        #[test]
        fn test_both_end_conditions_first_wins() {
            let mut task = template(RecurringType::Daily, ymd(2024, 1, 1));
            task.recurring_end_count = Some(10);
            task.recurring_end_date = Some(ymd(2024, 1, 4));
            let occurrences = expand(&task, ymd(2024, 1, 1), ymd(2024, 1, 31));
            assert_eq!(occurrences.len(), 4);

            task.recurring_end_count = Some(2);
            let occurrences = expand(&task, ymd(2024, 1, 1), ymd(2024, 1, 31));
            assert_eq!(occurrences.len(), 2);
        }

        #[test]
        fn test_expand_reports_truncation() {
            let task = template(RecurringType::Daily, ymd(2024, 1, 1));
            let manager = RecurrenceManager::new(&task).unwrap();
            let ledger = CompletionLedger::new();
            let expansion = manager.expand_between(ymd(2024, 1, 1), ymd(2024, 12, 31), &ledger);
            assert_eq!(expansion.occurrences.len(), MAX_OCCURRENCES_PER_CALL);
            assert!(expansion.truncated);

            let expansion = manager.expand_between(ymd(2024, 1, 1), ymd(2024, 1, 31), &ledger);
            assert!(!expansion.truncated);
        }

        #[test]
        fn test_series_ending_at_cap_is_not_truncated() {
            let anchor = ymd(2024, 1, 1);
            let window_end = anchor + Days::new(199);

            let mut by_date = template(RecurringType::Daily, anchor);
            by_date.recurring_end_date = Some(anchor + Days::new(99));
            let mut by_count = template(RecurringType::Daily, anchor);
            by_count.recurring_end_count = Some(100);

            for task in [by_date, by_count] {
                let manager = RecurrenceManager::new(&task).unwrap();
                let expansion =
                    manager.expand_between(anchor, window_end, &CompletionLedger::new());
                assert_eq!(expansion.occurrences.len(), MAX_OCCURRENCES_PER_CALL);
                assert!(!expansion.truncated);
            }

            let mut longer = template(RecurringType::Daily, anchor);
            longer.recurring_end_count = Some(101);
            let manager = RecurrenceManager::new(&longer).unwrap();
            let expansion = manager.expand_between(anchor, window_end, &CompletionLedger::new());
            assert!(expansion.truncated);
        }

        #[test]
        fn test_preview_and_next() {
            let mut task = template(RecurringType::Weekly, ymd(2024, 1, 1));
            task.excluded_dates.insert(ymd(2024, 1, 8));
            let manager = RecurrenceManager::new(&task).unwrap();
            let preview = manager.preview_occurrences(ymd(2024, 1, 2), 2, &CompletionLedger::new());
            assert_eq!(dates(&preview), vec![ymd(2024, 1, 15), ymd(2024, 1, 22)]);
            assert_eq!(manager.next_occurrence_after(ymd(2024, 1, 1)), Some(ymd(2024, 1, 15)));
        }

        #[test]
        fn test_next_occurrence_after_series_end() {
            let mut task = template(RecurringType::Daily, ymd(2024, 1, 1));
            task.recurring_end_date = Some(ymd(2024, 1, 5));
            let manager = RecurrenceManager::new(&task).unwrap();
            assert_eq!(manager.next_occurrence_after(ymd(2024, 1, 5)), None);
        }

        #[test]
        fn test_is_occurrence_date() {
            let mut task = template(RecurringType::Daily, ymd(2024, 1, 1));
            task.excluded_dates.insert(ymd(2024, 1, 3));
            task.recurring_end_count = Some(5);
            let manager = RecurrenceManager::new(&task).unwrap();
            assert!(manager.is_occurrence_date(ymd(2024, 1, 2)));
            assert!(!manager.is_occurrence_date(ymd(2024, 1, 3)));
            // Fifth emitted occurrence lands on 01-06 because 01-03 is excluded.
            assert!(manager.is_occurrence_date(ymd(2024, 1, 6)));
            assert!(!manager.is_occurrence_date(ymd(2024, 1, 7)));
            assert!(!manager.is_occurrence_date(ymd(2023, 12, 31)));
        }
    }
}
