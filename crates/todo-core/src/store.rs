//! In-memory task store backing the interactive shell.
//!
//! Ids come from a monotonically increasing counter and are never reused,
//! even after the task holding them is deleted. Nothing is persisted.

use crate::error::{Result, TodoError};
use crate::task::{now, validate_description, validate_title, LocalTask, NewTask};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct TodoStore {
    tasks: BTreeMap<u64, LocalTask>,
    next_id: u64,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, title: &str, description: Option<&str>) -> Result<&LocalTask> {
        let input = NewTask::parse(title, description)?;
        let id = self.next_id;
        self.next_id += 1;
        Ok(self.tasks.entry(id).or_insert(LocalTask::new(id, input)))
    }

    pub fn get(&self, id: u64) -> Result<&LocalTask> {
        self.tasks.get(&id).ok_or_else(|| not_found(id))
    }

    /// All tasks in id order.
    pub fn list(&self) -> Vec<&LocalTask> {
        self.tasks.values().collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Update title and/or description. A blank title keeps the current one;
    /// at least one field has to carry a value.
    pub fn update(
        &mut self,
        id: u64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<&LocalTask> {
        let title = title.filter(|t| !t.trim().is_empty());
        let description = description.filter(|d| !d.trim().is_empty());
        if title.is_none() && description.is_none() {
            return Err(TodoError::validation("Provide new title or description"));
        }
        let title = title.map(validate_title).transpose()?;
        let description = validate_description(description)?;

        let task = self.find_mut(id)?;
        if let Some(t) = title {
            task.title = t;
        }
        if description.is_some() {
            task.description = description;
        }
        task.updated_at = now();
        Ok(task)
    }

    pub fn delete(&mut self, id: u64) -> Result<LocalTask> {
        self.tasks.remove(&id).ok_or_else(|| not_found(id))
    }

    pub fn complete(&mut self, id: u64) -> Result<&LocalTask> {
        self.set_completed(id, true)
    }

    pub fn incomplete(&mut self, id: u64) -> Result<&LocalTask> {
        self.set_completed(id, false)
    }

    /// Human-readable summary: "3 tasks, 1 completed, 2 pending"
    pub fn summary(&self) -> String {
        let total = self.len();
        let done = self.tasks.values().filter(|t| t.completed).count();
        let noun = if total == 1 { "task" } else { "tasks" };
        format!("{total} {noun}, {done} completed, {} pending", total - done)
    }

    fn set_completed(&mut self, id: u64, completed: bool) -> Result<&LocalTask> {
        let task = self.find_mut(id)?;
        task.completed = completed;
        task.updated_at = now();
        Ok(task)
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut LocalTask> {
        self.tasks.get_mut(&id).ok_or_else(|| not_found(id))
    }
}

fn not_found(id: u64) -> TodoError {
    TodoError::TaskNotFound(id.to_string())
}
