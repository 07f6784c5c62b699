// Task store: ordered in-memory collection mirrored to a key-value backend

use crate::error::TaskError;
use crate::filter::ListQuery;
use crate::kv::KeyValueStore;
use crate::models::{Task, TaskDraft, generate_task_id, unique_prefix_len};
use crate::record::Record;
use eyre::{Context, Result};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Owns the task sequence and writes the whole of it back on every change
pub struct TaskStore<S: KeyValueStore> {
    backend: S,
    key: String,
    tasks: Vec<Task>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Open a store over the given backend using the default "tasks" key
    pub fn open(backend: S) -> Self {
        Self::open_with_key(backend, Task::collection_name())
    }

    /// Open a store that persists under a custom key
    pub fn open_with_key(backend: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            key: key.into(),
            tasks: Vec::new(),
        };
        store.load();
        store
    }

    /// Replace in-memory state with whatever the backend holds
    ///
    /// Missing or unreadable data is treated as an empty collection.
    pub fn load(&mut self) {
        self.tasks = match self.backend.get(&self.key) {
            Ok(Some(raw)) => parse_tasks(&self.key, &raw),
            Ok(None) => {
                debug!(key = %self.key, "No persisted tasks, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(key = %self.key, error = ?e, "Failed to read persisted tasks, starting empty");
                Vec::new()
            }
        };
        info!(key = %self.key, count = self.tasks.len(), "Loaded tasks");
    }

    // ========================================================================
    // Read API
    // ========================================================================

    /// All tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Id prefix length that is unique across the whole collection
    pub fn short_id_len(&self) -> usize {
        unique_prefix_len(self.tasks.iter().map(|t| t.id()))
    }

    /// Shortest displayable id that `find_by_prefix` resolves back to this task
    pub fn short_id<'t>(&self, task: &'t Task) -> &'t str {
        task.short_id(self.short_id_len())
    }

    /// Resolve a full id or a unique id prefix
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Task, TaskError> {
        if let Some(task) = self.get(prefix) {
            return Ok(task);
        }
        if prefix.is_empty() {
            return Err(TaskError::NotFound(prefix.to_string()));
        }

        let mut matches = self.tasks.iter().filter(|t| t.id().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task),
            (Some(_), Some(_)) => Err(TaskError::AmbiguousId(prefix.to_string())),
            (None, _) => Err(TaskError::NotFound(prefix.to_string())),
        }
    }

    /// Filtered and optionally sorted copy; stored order is untouched
    pub fn list(&self, query: &ListQuery) -> Vec<Task> {
        query.apply(&self.tasks)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new task and persist
    pub fn create(&mut self, draft: &TaskDraft) -> Result<Task> {
        let task = Task::from_draft(draft)?;

        self.tasks.push(task.clone());
        if let Err(e) = self.persist() {
            self.tasks.pop();
            return Err(e);
        }

        info!(id = %task.id, title = %task.title, "Created task");
        Ok(task)
    }

    /// Replace the mutable fields of an existing task and persist
    pub fn update(&mut self, id: &str, draft: &TaskDraft) -> Result<Task> {
        let index = self.position(id)?;

        let previous = self.tasks[index].clone();
        self.tasks[index].apply(draft)?;
        if let Err(e) = self.persist() {
            self.tasks[index] = previous;
            return Err(e);
        }

        let task = self.tasks[index].clone();
        info!(id = %task.id, status = %task.status, "Updated task");
        Ok(task)
    }

    /// Remove a task and persist, returning what was removed
    pub fn delete(&mut self, id: &str) -> Result<Task> {
        let index = self.position(id)?;

        let task = self.tasks.remove(index);
        if let Err(e) = self.persist() {
            self.tasks.insert(index, task);
            return Err(e);
        }

        info!(id = %task.id, "Deleted task");
        Ok(task)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn position(&self, id: &str) -> Result<usize, TaskError> {
        self.tasks
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.tasks).context("Failed to serialize tasks")?;
        self.backend
            .set(&self.key, &json)
            .with_context(|| format!("Failed to persist tasks under key {}", self.key))?;
        debug!(key = %self.key, count = self.tasks.len(), "Persisted tasks");
        Ok(())
    }
}

/// Decode a persisted collection, assigning ids where they are missing or repeated
fn parse_tasks(key: &str, raw: &str) -> Vec<Task> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let mut tasks: Vec<Task> = match serde_json::from_str(raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(key, error = ?e, "Failed to parse persisted tasks, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    for task in &mut tasks {
        if task.id.is_empty() || !seen.insert(task.id.clone()) {
            let id = generate_task_id();
            debug!(old_id = %task.id, new_id = %id, "Assigning id to task");
            task.id = id;
            seen.insert(task.id.clone());
        }
    }

    tasks
}
