use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Current time in the ISO-8601 form stored in `createdAt` / `updatedAt`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Baixa,
    #[default]
    Media,
    Alta,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baixa" | "low" => Ok(TaskPriority::Baixa),
            "media" | "média" | "medium" => Ok(TaskPriority::Media),
            "alta" | "high" => Ok(TaskPriority::Alta),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::Baixa => write!(f, "baixa"),
            TaskPriority::Media => write!(f, "media"),
            TaskPriority::Alta => write!(f, "alta"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pendente,
    EmProgresso,
    Concluida,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task status: {0}")]
pub struct ParseTaskStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pendente" | "pending" => Ok(TaskStatus::Pendente),
            "em-progresso" | "in-progress" => Ok(TaskStatus::EmProgresso),
            "concluida" | "concluída" | "done" | "completed" => Ok(TaskStatus::Concluida),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pendente => write!(f, "pendente"),
            TaskStatus::EmProgresso => write!(f, "em-progresso"),
            TaskStatus::Concluida => write!(f, "concluida"),
        }
    }
}

/// Which calendar days a recurring task lands on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecurringType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Every `recurringInterval` days from the anchor.
    Custom,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence type: {0}")]
pub struct ParseRecurringTypeError(String);

impl FromStr for RecurringType {
    type Err = ParseRecurringTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RecurringType::Daily),
            "weekly" => Ok(RecurringType::Weekly),
            "monthly" => Ok(RecurringType::Monthly),
            "yearly" => Ok(RecurringType::Yearly),
            "custom" => Ok(RecurringType::Custom),
            _ => Err(ParseRecurringTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for RecurringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurringType::Daily => write!(f, "daily"),
            RecurringType::Weekly => write!(f, "weekly"),
            RecurringType::Monthly => write!(f, "monthly"),
            RecurringType::Yearly => write!(f, "yearly"),
            RecurringType::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Weekday::Sunday,
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid weekday: {0}")]
pub struct ParseWeekdayError(String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sun" | "sunday" => Ok(Weekday::Sunday),
            "mon" | "monday" => Ok(Weekday::Monday),
            "tue" | "tuesday" => Ok(Weekday::Tuesday),
            "wed" | "wednesday" => Ok(Weekday::Wednesday),
            "thu" | "thursday" => Ok(Weekday::Thursday),
            "fri" | "friday" => Ok(Weekday::Friday),
            "sat" | "saturday" => Ok(Weekday::Saturday),
            _ => Err(ParseWeekdayError(s.to_string())),
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weekday::Sunday => "sunday",
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
        };
        f.write_str(name)
    }
}

/// A checklist entry inside a task. Copied verbatim onto occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        let now = now_timestamp();
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            status: TaskStatus::Pendente,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// The persisted task record.
///
/// A task with `is_recurring == false` is a single concrete task and its
/// `status` is authoritative. With `is_recurring == true` the record is the
/// template of a series: the recurrence fields describe which dates produce
/// occurrences and `status` is only the fallback copied onto them.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    /// Anchors the recurrence when present.
    pub due_date: Option<NaiveDate>,
    /// `HH:MM` local time, copied onto every occurrence.
    pub due_time: Option<String>,
    /// ISO-8601. Stands in for `due_date` as the anchor when that is absent,
    /// so it is kept as text and parsed leniently.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_type: Option<RecurringType>,
    pub recurring_interval: Option<i32>,
    #[serde(default)]
    pub recurring_days: Vec<Weekday>,
    pub recurring_end_date: Option<NaiveDate>,
    pub recurring_end_count: Option<u32>,
    #[serde(default)]
    pub excluded_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Default for Task {
    fn default() -> Self {
        let now = now_timestamp();
        Self {
            // Random leading characters keep short id prefixes unique.
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            description: String::new(),
            priority: TaskPriority::Media,
            status: TaskStatus::Pendente,
            due_date: None,
            due_time: None,
            created_at: now.clone(),
            updated_at: now,
            is_recurring: false,
            recurring_type: None,
            recurring_interval: None,
            recurring_days: Vec::new(),
            recurring_end_date: None,
            recurring_end_count: None,
            excluded_dates: BTreeSet::new(),
            subtasks: Vec::new(),
        }
    }
}

impl Task {
    /// Interval used by `custom` and by weekly rules without explicit days.
    /// Missing or non-positive values behave as 1.
    pub fn effective_interval(&self) -> i64 {
        i64::from(self.recurring_interval.unwrap_or(1).max(1))
    }

    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.excluded_dates.contains(&date)
    }
}

/// Recurrence settings supplied when creating a task.
#[derive(Debug, Clone, Default)]
pub struct RecurrenceData {
    pub recurring_type: Option<RecurringType>,
    pub interval: Option<i32>,
    pub days: Vec<Weekday>,
    pub end_date: Option<NaiveDate>,
    pub end_count: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<String>,
    /// When present, the new task becomes the template of a series.
    pub recurrence: Option<RecurrenceData>,
    pub subtasks: Vec<String>,
}

impl NewTaskData {
    pub fn into_task(self) -> Task {
        let mut task = Task {
            title: self.title,
            description: self.description.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            due_date: self.due_date,
            due_time: self.due_time,
            subtasks: self.subtasks.into_iter().map(Subtask::new).collect(),
            ..Default::default()
        };
        if let Some(recurrence) = self.recurrence {
            task.is_recurring = true;
            task.recurring_type = recurrence.recurring_type;
            task.recurring_interval = recurrence.interval;
            task.recurring_days = recurrence.days;
            task.recurring_end_date = recurrence.end_date;
            task.recurring_end_count = recurrence.end_count;
        }
        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&TaskStatus::EmProgresso).unwrap(), "\"em-progresso\"");
        assert_eq!(serde_json::to_string(&TaskStatus::Concluida).unwrap(), "\"concluida\"");
        assert_eq!("em-progresso".parse::<TaskStatus>().unwrap(), TaskStatus::EmProgresso);
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Concluida);
        assert!("finished".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_priority_accepts_english_aliases() {
        assert_eq!("high".parse::<TaskPriority>().unwrap(), TaskPriority::Alta);
        assert_eq!("baixa".parse::<TaskPriority>().unwrap(), TaskPriority::Baixa);
        assert_eq!(TaskPriority::Media.to_string(), "media");
    }

    #[test]
    fn test_weekday_from_chrono() {
        assert_eq!(Weekday::from(chrono::Weekday::Sun), Weekday::Sunday);
        assert_eq!("Wed".parse::<Weekday>().unwrap(), Weekday::Wednesday);
    }

    #[test]
    fn test_task_deserializes_legacy_record() {
        let json = r#"{
            "id": "abc",
            "title": "Water plants",
            "description": "",
            "priority": "alta",
            "status": "pendente",
            "dueDate": "2024-01-01",
            "dueTime": "08:30",
            "createdAt": "2023-12-31T10:00:00.000Z",
            "updatedAt": "2023-12-31T10:00:00.000Z",
            "isRecurring": true,
            "recurringType": "weekly",
            "recurringDays": ["monday", "wednesday"],
            "excludedDates": ["2024-01-03"],
            "subtasks": [{
                "id": "s1",
                "title": "Fill can",
                "status": "pendente",
                "createdAt": "",
                "updatedAt": ""
            }]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.is_recurring);
        assert_eq!(task.recurring_type, Some(RecurringType::Weekly));
        assert_eq!(task.recurring_days, vec![Weekday::Monday, Weekday::Wednesday]);
        assert!(task.is_excluded(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()));
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.recurring_end_count, None);
    }

    #[test]
    fn test_task_serialization_omits_absent_fields() {
        let task = Task {
            id: "t1".to_string(),
            title: "One-off".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("dueDate").is_none());
        assert!(value.get("recurringType").is_none());
        assert_eq!(value["isRecurring"], serde_json::json!(false));
    }

    #[test]
    fn test_effective_interval_clamps() {
        let mut task = Task::default();
        assert_eq!(task.effective_interval(), 1);
        task.recurring_interval = Some(0);
        assert_eq!(task.effective_interval(), 1);
        task.recurring_interval = Some(-4);
        assert_eq!(task.effective_interval(), 1);
        task.recurring_interval = Some(3);
        assert_eq!(task.effective_interval(), 3);
    }

    #[test]
    fn test_new_task_data_builds_template() {
        let data = NewTaskData {
            title: "Stretch".to_string(),
            recurrence: Some(RecurrenceData {
                recurring_type: Some(RecurringType::Custom),
                interval: Some(2),
                ..Default::default()
            }),
            subtasks: vec!["Neck".to_string()],
            ..Default::default()
        };
        let task = data.into_task();
        assert!(task.is_recurring);
        assert_eq!(task.recurring_type, Some(RecurringType::Custom));
        assert_eq!(task.recurring_interval, Some(2));
        assert_eq!(task.subtasks[0].title, "Neck");
        assert_eq!(task.status, TaskStatus::Pendente);
    }
}
