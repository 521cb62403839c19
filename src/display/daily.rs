//! Daily plan display formatting

use crate::models::DailyTask;
use crate::services::{DayHistory, WeeklyStats};

/// Format a day's tasks as a table
pub fn format_task_list(tasks: &[DailyTask]) -> String {
    if tasks.is_empty() {
        return "No tasks planned.".to_string();
    }

    let id_width = tasks
        .iter()
        .map(|t| t.id.to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);

    let subject_width = tasks
        .iter()
        .map(|t| t.subject.len())
        .max()
        .unwrap_or(7)
        .max(7);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<id_width$}  {:<10}  {:<subject_width$}  {:<8}  {}\n",
        "ID", "Date", "Subject", "Status", "Task",
    ));
    output.push_str(&format!(
        "{:-<id_width$}  {:-<10}  {:-<subject_width$}  {:-<8}  {:-<20}\n",
        "", "", "", "", "",
    ));

    for task in tasks {
        output.push_str(&format!(
            "{:<id_width$}  {:<10}  {:<subject_width$}  {:<8}  {}\n",
            task.id.to_string(),
            task.date.to_string(),
            task.subject,
            task.status.to_string(),
            task.description,
        ));
        if !task.actual_work.is_empty() && task.actual_work != task.description {
            output.push_str(&format!(
                "{:<id_width$}  {:<10}  {:<subject_width$}  {:<8}  done: {}\n",
                "", "", "", "", task.actual_work,
            ));
        }
    }

    output
}

/// Format the seven-day overview with a one-line summary
pub fn format_week(days: &[DayHistory], stats: &WeeklyStats) -> String {
    let mut output = String::new();

    for day in days {
        let score = day
            .score
            .map(|s| format!("{:>3}%", s))
            .unwrap_or_else(|| "   -".to_string());
        output.push_str(&format!(
            "{} {}  {}  {}\n",
            day.weekday,
            day.date,
            score,
            bar(day.score)
        ));
    }

    output.push_str(&format!(
        "\nAverage: {}%  Days worked: {}/7\n",
        stats.average, stats.days_worked
    ));

    if !stats.subject_frequency.is_empty() {
        let subjects: Vec<String> = stats
            .subject_frequency
            .iter()
            .map(|(subject, count)| format!("{} ({})", subject, count))
            .collect();
        output.push_str(&format!("Subjects: {}\n", subjects.join(", ")));
    }

    output
}

fn bar(score: Option<u32>) -> String {
    let filled = score.map_or(0, |s| (s.min(100) / 10) as usize);
    format!("{}{}", "#".repeat(filled), ".".repeat(10 - filled))
}
