// Query filtering for task listings

use crate::models::{Task, TaskStatus};
use std::fmt;
use std::str::FromStr;

/// Which statuses a listing includes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "All"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<TaskStatus>().map(StatusFilter::Only)
    }
}

/// A read-only view over the task collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub status: StatusFilter,
    pub sort_by_due_date: bool,
}

impl ListQuery {
    pub fn new(status: StatusFilter, sort_by_due_date: bool) -> Self {
        Self {
            status,
            sort_by_due_date,
        }
    }

    /// Filter then optionally sort; equal due dates keep their relative order
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut selected: Vec<Task> = tasks.iter().filter(|t| self.status.matches(t)).cloned().collect();
        if self.sort_by_due_date {
            // sort_by_key is stable
            selected.sort_by_key(|t| t.due_date);
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, TaskDraft};

    fn task(title: &str, due: &str, status: TaskStatus) -> Task {
        Task::from_draft(&TaskDraft::new(title, "desc", due, status)).unwrap()
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task("a", "2024-03-01", TaskStatus::Pending),
            task("b", "2024-01-01", TaskStatus::Completed),
            task("c", "2024-03-01", TaskStatus::InProgress),
            task("d", "2024-02-01", TaskStatus::Pending),
            task("e", "2024-01-01", TaskStatus::Pending),
        ]
    }

    #[test]
    fn test_all_unsorted_keeps_insertion_order() {
        let tasks = sample();
        let listed = ListQuery::default().apply(&tasks);
        assert_eq!(titles(&listed), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_status_filter_keeps_relative_order() {
        let tasks = sample();
        let listed = ListQuery::new(StatusFilter::Only(TaskStatus::Pending), false).apply(&tasks);
        assert_eq!(titles(&listed), vec!["a", "d", "e"]);
    }

    #[test]
    fn test_sort_by_due_date_is_stable() {
        let tasks = sample();
        let listed = ListQuery::new(StatusFilter::All, true).apply(&tasks);
        assert_eq!(titles(&listed), vec!["b", "e", "d", "a", "c"]);
        assert!(listed.windows(2).all(|w| w[0].due_date <= w[1].due_date));
    }

    #[test]
    fn test_filter_and_sort_combined() {
        let tasks = sample();
        let listed = ListQuery::new(StatusFilter::Only(TaskStatus::Pending), true).apply(&tasks);
        assert_eq!(titles(&listed), vec!["e", "d", "a"]);
    }

    #[test]
    fn test_status_filter_parse_and_display() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "in-progress".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(TaskStatus::InProgress)
        );
        assert!("someday".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::All.to_string(), "All");
        assert_eq!(StatusFilter::Only(TaskStatus::Completed).to_string(), "Completed");
    }
}
