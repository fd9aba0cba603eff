//! Plain-text rendering of boards, quotes, calendars and history.

use chrono::NaiveDate;
use habit_core::calendar::{DayCell, WEEK_LABELS};
use habit_core::{CalendarView, History, Quote, Task, TaskBoard};
use std::fmt::Write;

const CELL_WIDTH: usize = 6;

pub fn tasks(board: &TaskBoard) -> String {
    let (persistent, normal) = board.partition();
    let mut out = String::new();
    task_section(&mut out, "毎日やること", &persistent);
    task_section(&mut out, "今日だけやること", &normal);
    out
}

fn task_section(out: &mut String, heading: &str, tasks: &[&Task]) {
    let _ = writeln!(out, "{heading}");
    if tasks.is_empty() {
        let _ = writeln!(out, "  (なし)");
    }
    for task in tasks {
        let mark = if task.status { "x" } else { " " };
        let id = if task.is_stored() {
            format!("#{}", task.id)
        } else {
            "#-".to_string()
        };
        let _ = writeln!(out, "  [{mark}] {id:<5} {}", task.title);
    }
}

pub fn quote(quote: Option<&Quote>) -> String {
    match quote {
        Some(quote) => format!(
            "「{}」\n\"{}\"\n— {}\n",
            quote.quote_ja, quote.quote_en, quote.author
        ),
        None => "名言はありません\n".to_string(),
    }
}

pub fn calendar(view: &CalendarView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}年{}月", view.month.year(), view.month.month());
    let labels: String = WEEK_LABELS
        .iter()
        // Labels are double-width, so pad one column less.
        .map(|label| format!("{label:>width$}", width = CELL_WIDTH - 1))
        .collect();
    let _ = writeln!(out, "{}", labels.trim_end());
    for row in &view.rows {
        let line: String = row
            .iter()
            .map(|cell| {
                let text = cell.as_ref().map(day_text).unwrap_or_default();
                format!("{text:>width$}", width = CELL_WIDTH)
            })
            .collect();
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

fn day_text(cell: &DayCell) -> String {
    let mark = if cell.achieved() { "●" } else { "" };
    if cell.selected {
        format!("[{}{mark}]", cell.day)
    } else {
        format!("{}{mark}", cell.day)
    }
}

pub fn history(date: NaiveDate, history: Option<&History>) -> String {
    let Some(history) = history else {
        return format!("{date}\n記録はありません\n");
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}のやったこと", history.date);
    if history.tasks.is_empty() {
        let _ = writeln!(out, "  やったことはありません");
    }
    for title in &history.tasks {
        let _ = writeln!(out, "  - {title}");
    }
    if !history.quotes.is_empty() {
        let _ = writeln!(out);
        for revealed in &history.quotes {
            out.push_str(&quote(Some(revealed)));
        }
    }
    out
}
