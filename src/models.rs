// Data models for tasktrack

use crate::error::TaskError;
use crate::record::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date format used for due dates, both on the wire and at the CLI
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Empty only for legacy records read before ids existed; the store fills it in on load
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Build a task from a checked draft, assigning a fresh id
    pub fn from_draft(draft: &TaskDraft) -> Result<Self, TaskError> {
        let due_date = draft.validate()?;
        Ok(Self {
            id: generate_task_id(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            due_date,
            status: draft.status,
        })
    }

    /// Replace every mutable field with the draft's values; the id is kept
    pub fn apply(&mut self, draft: &TaskDraft) -> Result<(), TaskError> {
        let due_date = draft.validate()?;
        self.title = draft.title.clone();
        self.description = draft.description.clone();
        self.due_date = due_date;
        self.status = draft.status;
        Ok(())
    }

    /// The task's current field values as an editable draft
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date.format(DATE_FORMAT).to_string(),
            status: self.status,
        }
    }

    /// The first `len` characters of the id, for display
    pub fn short_id(&self, len: usize) -> &str {
        let end = self.id.char_indices().nth(len).map(|(i, _)| i).unwrap_or(self.id.len());
        &self.id[..end]
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "tasks"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Accepts display names and their kebab/snake spellings, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "complete" | "done" => Ok(TaskStatus::Completed),
            _ => Err(format!(
                "unknown status: {} (expected Pending, In Progress or Completed)",
                s
            )),
        }
    }
}

/// User-supplied fields for creating or editing a task
///
/// The due date stays raw text until validation so blank input can be told
/// apart from a malformed date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: impl Into<String>,
        status: TaskStatus,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_date: due_date.into(),
            status,
        }
    }

    /// Presence check on every required field, then parse the due date
    pub fn validate(&self) -> Result<NaiveDate, TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::Validation { field: "title" });
        }
        if self.description.trim().is_empty() {
            return Err(TaskError::Validation { field: "description" });
        }
        if self.due_date.trim().is_empty() {
            return Err(TaskError::Validation { field: "dueDate" });
        }
        parse_due_date(&self.due_date)
    }
}

pub fn parse_due_date(raw: &str) -> Result<NaiveDate, TaskError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| TaskError::InvalidDueDate(raw.to_string()))
}

/// Shortest displayed id length
pub const MIN_SHORT_ID_LEN: usize = 8;

/// Shortest prefix length (at least `MIN_SHORT_ID_LEN`) that tells every id apart
///
/// v7 ids share their leading timestamp digits when created close together,
/// so a fixed-width prefix is not enough.
pub fn unique_prefix_len<'a>(ids: impl IntoIterator<Item = &'a str>) -> usize {
    let mut ids: Vec<&str> = ids.into_iter().collect();
    ids.sort_unstable();

    ids.windows(2)
        .map(|pair| {
            let common = pair[0].chars().zip(pair[1].chars()).take_while(|(a, b)| a == b).count();
            common + 1
        })
        .fold(MIN_SHORT_ID_LEN, usize::max)
}

/// Time-ordered unique id for a new task
pub fn generate_task_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
