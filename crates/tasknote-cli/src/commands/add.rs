use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use tasknote_core::models::{NewTaskData, RecurrenceData};
use tasknote_core::repository::Repository;

use crate::cli::AddCommand;
use crate::parser::{parse_date_arg, parse_time_arg, parse_weekdays};
use crate::util::short_id;
use crate::views::table::describe_recurrence;

fn recurrence_from_command(command: &AddCommand) -> Result<Option<RecurrenceData>> {
    let Some(shortcut) = command.every else {
        return Ok(None);
    };

    let days = match command.on.as_deref().or(shortcut.implied_days()) {
        Some(days) => parse_weekdays(days)?,
        None => Vec::new(),
    };

    Ok(Some(RecurrenceData {
        recurring_type: Some(shortcut.recurring_type()),
        interval: command.interval,
        days,
        end_date: command.until.as_deref().map(parse_date_arg).transpose()?,
        end_count: command.count,
    }))
}

pub async fn add_task(repo: &impl Repository, command: AddCommand) -> Result<()> {
    let new_task_data = NewTaskData {
        due_date: command.due.as_deref().map(parse_date_arg).transpose()?,
        due_time: command.at.as_deref().map(parse_time_arg).transpose()?,
        recurrence: recurrence_from_command(&command)?,
        title: command.title,
        description: command.description,
        priority: command.priority,
        subtasks: command.subtasks,
    };

    let added_task = repo.add_task(new_task_data).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let subtle_style = Style::new().bright_black();
    let id = short_id(&added_task.id);

    if added_task.is_recurring {
        println!(
            "{} Created recurring task: {}",
            "✓".style(success_style),
            added_task.title.bright_white().bold()
        );
        println!("  {} Task ID: {}", "→".style(info_style), id.yellow());
        println!(
            "  {} {}",
            "→".style(info_style),
            describe_recurrence(&added_task).cyan()
        );
        println!(
            "   {} Preview upcoming: tasknote preview {}",
            "•".style(subtle_style),
            id.yellow()
        );
    } else {
        println!(
            "{} Created task: {}",
            "✓".style(success_style),
            added_task.title.bright_white().bold()
        );
        println!("  {} Task ID: {}", "→".style(info_style), id.yellow());
        if let Some(due_date) = added_task.due_date {
            println!(
                "  {} Due: {}",
                "→".style(info_style),
                due_date.to_string().cyan()
            );
        }
        println!(
            "   {} Mark complete: tasknote done {}",
            "•".style(subtle_style),
            id.yellow()
        );
    }

    Ok(())
}
