// Plain-text rendering of tasks and forms

use crate::filter::ListQuery;
use crate::models::{Task, TaskDraft, TaskStatus};
use colored::{ColoredString, Colorize};

pub const EMPTY_LIST: &str = "No tasks available. Add a new task!";

const HEADERS: [&str; 5] = ["ID", "Title", "Description", "Due Date", "Status"];

fn colorize_status(status: TaskStatus, padded: String) -> ColoredString {
    match status {
        TaskStatus::Pending => padded.yellow(),
        TaskStatus::InProgress => padded.cyan(),
        TaskStatus::Completed => padded.green(),
    }
}

/// Render tasks as an aligned table, or the empty-list hint
///
/// Ids are cut to `id_len` characters; pass a length that is unique across the store.
pub fn task_table(tasks: &[Task], id_len: usize) -> String {
    if tasks.is_empty() {
        return format!("{}\n", EMPTY_LIST);
    }

    let rows: Vec<[String; 4]> = tasks
        .iter()
        .map(|t| {
            [
                t.short_id(id_len).to_string(),
                t.title.clone(),
                t.description.clone(),
                t.due_date.to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h, w = *w))
        .collect();
    out.push_str(&header.join("  ").bold().to_string());
    out.push('\n');

    for (row, task) in rows.iter().zip(tasks) {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
            .collect();
        out.push_str(&cells.join("  "));
        out.push_str("  ");
        out.push_str(&colorize_status(task.status, task.status.to_string()).to_string());
        out.push('\n');
    }
    out
}

/// One-line summary of the active listing options
pub fn query_summary(query: &ListQuery) -> String {
    let sort = if query.sort_by_due_date {
        "sorted by due date"
    } else {
        "in insertion order"
    };
    format!("Status: {} ({})", query.status, sort)
}

/// Full detail of a single task
pub fn task_detail(task: &Task) -> String {
    format!(
        "ID:          {}\nTitle:       {}\nDescription: {}\nDue Date:    {}\nStatus:      {}\n",
        task.id,
        task.title,
        task.description,
        task.due_date,
        colorize_status(task.status, task.status.to_string())
    )
}

/// Current contents of an add/edit form
pub fn task_form(editing: bool, form: &TaskDraft) -> String {
    let heading = if editing { "Edit Task" } else { "Add Task" };
    format!(
        "{}\n  title:       {}\n  description: {}\n  due:         {}\n  status:      {}\n",
        heading.bold(),
        form.title,
        form.description,
        form.due_date,
        form.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::StatusFilter;

    fn task(title: &str, status: TaskStatus) -> Task {
        Task::from_draft(&TaskDraft::new(title, "Q3 summary", "2024-06-01", status)).unwrap()
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(task_table(&[], 8), format!("{}\n", EMPTY_LIST));
    }

    #[test]
    fn test_table_has_header_and_rows() {
        let tasks = vec![task("Write report", TaskStatus::Pending), task("Ship", TaskStatus::Completed)];
        let table = task_table(&tasks, 10);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Title"));
        assert!(lines[0].contains("Due Date"));
        assert!(lines[1].contains("Write report"));
        assert!(lines[1].contains("2024-06-01"));
        assert!(lines[1].contains("Pending"));
        assert!(lines[2].contains(tasks[1].short_id(10)));
        assert!(lines[2].contains("Completed"));
    }

    #[test]
    fn test_query_summary() {
        assert_eq!(
            query_summary(&ListQuery::default()),
            "Status: All (in insertion order)"
        );
        assert_eq!(
            query_summary(&ListQuery::new(StatusFilter::Only(TaskStatus::InProgress), true)),
            "Status: In Progress (sorted by due date)"
        );
    }

    #[test]
    fn test_detail_and_form() {
        let t = task("Write report", TaskStatus::InProgress);
        let detail = task_detail(&t);
        assert!(detail.contains(&t.id));
        assert!(detail.contains("In Progress"));

        let form = task_form(true, &t.to_draft());
        assert!(form.contains("Edit Task"));
        assert!(form.contains("Write report"));
        assert!(task_form(false, &TaskDraft::default()).contains("Add Task"));
    }
}
