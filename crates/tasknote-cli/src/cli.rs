use clap::{Parser, Subcommand, ValueEnum};
use tasknote_core::models::{RecurringType, TaskPriority};

/// Tasknote: recurring tasks, their occurrences and what you've done
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// List tasks and occurrences in a date window
    List(ListCommand),
    /// Complete a task, or one occurrence of a recurring task
    Done(DoneCommand),
    /// Reopen one completed occurrence of a recurring task
    Undo(UndoCommand),
    /// Skip one occurrence of a recurring task
    Skip(SkipCommand),
    /// Show the next occurrences of a recurring task
    Preview(PreviewCommand),
    /// Show every field of a task
    Show(ShowCommand),
    /// Delete a task
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// The description of the task
    #[clap(short, long)]
    pub description: Option<String>,
    /// The due date of the task (e.g. '2025-08-20', 'next friday')
    #[clap(short = 'D', long)]
    pub due: Option<String>,
    /// Time of day (e.g. '14:30', '9:00 AM')
    #[clap(long)]
    pub at: Option<String>,
    /// The priority of the task (baixa|media|alta, or low|medium|high)
    #[clap(short, long)]
    pub priority: Option<TaskPriority>,
    /// Checklist entries
    #[clap(short, long = "subtask")]
    pub subtasks: Vec<String>,
    /// Make the task recurring
    #[clap(long, value_enum)]
    pub every: Option<RecurrenceShortcut>,
    /// Interval for 'weekly' (weeks) and 'custom' (days)
    #[clap(long, requires = "every")]
    pub interval: Option<i32>,
    /// Days of week for weekly recurrence (mon,tue,... or weekdays/weekends)
    #[clap(long, requires = "every")]
    pub on: Option<String>,
    /// Last date of the series
    #[clap(long, requires = "every")]
    pub until: Option<String>,
    /// Maximum number of occurrences
    #[clap(long, requires = "every")]
    pub count: Option<u32>,
}

/// Human-friendly recurrence patterns
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceShortcut {
    /// Every day
    Daily,
    /// Every week (same weekday, or the days given with --on)
    Weekly,
    /// Every month (same day of month)
    Monthly,
    /// Every year (same date)
    Yearly,
    /// Every N days (--interval)
    Custom,
    /// Monday to Friday
    Weekdays,
    /// Saturday and Sunday
    Weekends,
}

impl RecurrenceShortcut {
    pub fn recurring_type(self) -> RecurringType {
        match self {
            RecurrenceShortcut::Daily => RecurringType::Daily,
            RecurrenceShortcut::Weekly
            | RecurrenceShortcut::Weekdays
            | RecurrenceShortcut::Weekends => RecurringType::Weekly,
            RecurrenceShortcut::Monthly => RecurringType::Monthly,
            RecurrenceShortcut::Yearly => RecurringType::Yearly,
            RecurrenceShortcut::Custom => RecurringType::Custom,
        }
    }

    /// Day list implied by the shortcut itself.
    pub fn implied_days(self) -> Option<&'static str> {
        match self {
            RecurrenceShortcut::Weekdays => Some("weekdays"),
            RecurrenceShortcut::Weekends => Some("weekends"),
            _ => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// First day of the window (defaults to today minus the grace days)
    #[clap(long)]
    pub from: Option<String>,
    /// Last day of the window (defaults to today plus the lookahead days)
    #[clap(long)]
    pub to: Option<String>,
    /// Only show items with this status (pendente|em-progresso|concluida)
    #[clap(long)]
    pub status: Option<String>,
    /// Print JSON instead of a table
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DoneCommand {
    /// Task ID, ID prefix, or occurrence ID
    pub id: String,
    /// Occurrence date for recurring tasks (defaults to today)
    #[clap(long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct UndoCommand {
    /// Task ID, ID prefix, or occurrence ID
    pub id: String,
    /// Occurrence date (required unless an occurrence ID is given)
    #[clap(long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SkipCommand {
    /// Task ID, ID prefix, or occurrence ID
    pub id: String,
    /// Occurrence date (required unless an occurrence ID is given)
    #[clap(long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// Task ID or ID prefix
    pub id: String,
    /// Number of occurrences to show
    #[clap(long, short, default_value = "10")]
    pub count: usize,
    /// Start looking from this date (defaults to today)
    #[clap(long)]
    pub from: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// Task ID or ID prefix
    pub id: String,
    /// Print JSON instead of text
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}
