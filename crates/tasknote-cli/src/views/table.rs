use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use tasknote_core::agenda::AgendaItem;
use tasknote_core::dates::to_local_datetime;
use tasknote_core::models::{RecurringType, Task, TaskPriority, TaskStatus};
use tasknote_core::occurrence::{OccurrenceKey, TaskOccurrence};

use crate::util::short_id;

#[derive(Debug, Clone)]
pub struct ViewTask {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<String>,
    /// Set for occurrences of a recurring task
    pub template_id: Option<String>,
    pub subtasks_done: usize,
    pub subtasks_total: usize,
}

impl ViewTask {
    fn from_task(task: &Task, template_id: Option<&str>) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            due_time: task.due_time.clone(),
            template_id: template_id.map(str::to_string),
            subtasks_done: task
                .subtasks
                .iter()
                .filter(|s| s.status == TaskStatus::Concluida)
                .count(),
            subtasks_total: task.subtasks.len(),
        }
    }

    /// Id shown in the table. Occurrences get the short form of their
    /// occurrence id, which `done`, `undo` and `skip` accept back.
    pub fn display_id(&self) -> String {
        match (&self.template_id, self.due_date) {
            (Some(template_id), Some(date)) => {
                OccurrenceKey::new(short_id(template_id), date).occurrence_id()
            }
            _ => short_id(&self.id).to_string(),
        }
    }

    fn due_at(&self) -> Option<NaiveDateTime> {
        self.due_date
            .map(|date| to_local_datetime(date, self.due_time.as_deref()))
    }
}

impl From<&AgendaItem> for ViewTask {
    fn from(item: &AgendaItem) -> Self {
        ViewTask::from_task(item.task(), item.template_id())
    }
}

impl From<&TaskOccurrence> for ViewTask {
    fn from(occurrence: &TaskOccurrence) -> Self {
        ViewTask::from_task(occurrence.task(), Some(occurrence.template_id()))
    }
}

fn humanize_due(due_at: NaiveDateTime) -> String {
    match Local.from_local_datetime(&due_at).earliest() {
        Some(local) => local.humanize(),
        None => due_at.format("%Y-%m-%d %H:%M").to_string(),
    }
}

fn status_cell(status: TaskStatus) -> Cell {
    let cell = Cell::new(status.to_string());
    match status {
        TaskStatus::Concluida => cell.fg(Color::Green),
        TaskStatus::EmProgresso => cell.fg(Color::Cyan),
        TaskStatus::Pendente => cell,
    }
}

pub fn display_tasks(tasks: &[ViewTask]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let today = Local::now().date_naive();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Status", "Due", "Date", "Subtasks"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(task.display_id()));

        let mut display_name = String::new();
        if task.template_id.is_some() {
            display_name.push('↻');
            display_name.push(' ');
        }
        display_name.push_str(&task.title);

        let mut name_cell = Cell::new(display_name);
        name_cell = match task.status {
            TaskStatus::Concluida => name_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey),
            TaskStatus::Pendente | TaskStatus::EmProgresso => match task.priority {
                TaskPriority::Alta => name_cell.fg(Color::Red).add_attribute(Attribute::Bold),
                TaskPriority::Media => name_cell.fg(Color::Yellow),
                TaskPriority::Baixa => name_cell.fg(Color::Green),
            },
        };
        row.add_cell(name_cell);
        row.add_cell(status_cell(task.status));

        let due_cell = match (task.due_at(), task.due_date) {
            (Some(due_at), Some(due_date)) => {
                let cell = Cell::new(humanize_due(due_at));
                if task.status == TaskStatus::Concluida {
                    cell
                } else if due_date < today {
                    cell.fg(Color::Red)
                } else if due_date == today {
                    cell.fg(Color::Yellow)
                } else {
                    cell
                }
            }
            _ => Cell::new("None"),
        };
        row.add_cell(due_cell);
        row.add_cell(Cell::new(
            task.due_at()
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));

        row.add_cell(Cell::new(if task.subtasks_total == 0 {
            "-".to_string()
        } else {
            format!("{}/{}", task.subtasks_done, task.subtasks_total)
        }));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn describe_recurrence(task: &Task) -> String {
    let Some(recurring_type) = task.recurring_type.filter(|_| task.is_recurring) else {
        return "One-off".to_string();
    };
    let interval = task.effective_interval();
    let mut text = match recurring_type {
        RecurringType::Daily => "Every day".to_string(),
        RecurringType::Weekly if !task.recurring_days.is_empty() => {
            let days: Vec<String> = task.recurring_days.iter().map(|d| d.to_string()).collect();
            format!("Every {}", days.join(", "))
        }
        RecurringType::Weekly if interval > 1 => format!("Every {} weeks", interval),
        RecurringType::Weekly => "Every week".to_string(),
        RecurringType::Monthly => "Every month".to_string(),
        RecurringType::Yearly => "Every year".to_string(),
        RecurringType::Custom if interval > 1 => format!("Every {} days", interval),
        RecurringType::Custom => "Every day".to_string(),
    };
    if let Some(end) = task.recurring_end_date {
        text.push_str(&format!(", until {}", end));
    }
    if let Some(count) = task.recurring_end_count {
        text.push_str(&format!(", {} times", count));
    }
    text
}

pub fn display_task_details(task: &Task, next: Option<NaiveDate>, completed: usize) {
    let mut table = Table::new();
    let mut add = |field: &str, value: String| {
        table.add_row(vec![Cell::new(field).add_attribute(Attribute::Bold), Cell::new(value)]);
    };

    add("ID", task.id.clone());
    add("Title", task.title.clone());
    if !task.description.is_empty() {
        add("Description", task.description.clone());
    }
    add("Priority", task.priority.to_string());
    add("Status", task.status.to_string());
    add(
        "Due",
        match task.due_date {
            Some(date) => {
                let due_at = to_local_datetime(date, task.due_time.as_deref());
                format!("{} ({})", due_at.format("%Y-%m-%d %H:%M"), humanize_due(due_at))
            }
            None => "None".to_string(),
        },
    );
    add("Recurrence", describe_recurrence(task));
    if task.is_recurring {
        add(
            "Next occurrence",
            next.map(|d| d.to_string()).unwrap_or_else(|| "None".to_string()),
        );
        add("Completed occurrences", completed.to_string());
        if !task.excluded_dates.is_empty() {
            let skipped: Vec<String> = task.excluded_dates.iter().map(|d| d.to_string()).collect();
            add("Skipped", skipped.join(", "));
        }
    }
    for subtask in &task.subtasks {
        let mark = if subtask.status == TaskStatus::Concluida { "[x]" } else { "[ ]" };
        add("Subtask", format!("{} {}", mark, subtask.title));
    }
    add("Created", task.created_at.clone());

    println!("{table}");
}
