use crate::error::{Result, TodoError};
use crate::types::TaskStatus;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Current time at the microsecond precision the database keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Trim and bound a task title. Length is counted in chars, not bytes.
pub fn validate_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TodoError::validation("Title cannot be empty"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(TodoError::validation(format!(
            "Title exceeds {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

/// Trim and bound a description. Blank input normalizes to `None`.
pub fn validate_description(raw: Option<&str>) -> Result<Option<String>> {
    let Some(desc) = raw.map(str::trim) else {
        return Ok(None);
    };
    if desc.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(TodoError::validation(format!(
            "Description exceeds {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok((!desc.is_empty()).then(|| desc.to_string()))
}

// ---------------------------------------------------------------------------
// NewTask / TaskPatch
// ---------------------------------------------------------------------------

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

impl NewTask {
    pub fn parse(title: &str, description: Option<&str>) -> Result<Self> {
        Ok(Self {
            title: validate_title(title)?,
            description: validate_description(description)?,
        })
    }
}

/// Partial update. `description: Some("")` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Validate every provided field, returning the normalized patch.
    pub fn validated(self) -> Result<Self> {
        if self.is_empty() {
            return Err(TodoError::validation(
                "Provide at least one of title, description, or completed",
            ));
        }
        let title = self.title.as_deref().map(validate_title).transpose()?;
        let description = match self.description.as_deref() {
            Some(d) => Some(validate_description(Some(d))?.unwrap_or_default()),
            None => None,
        };
        Ok(Self {
            title,
            description,
            completed: self.completed,
        })
    }
}

// ---------------------------------------------------------------------------
// Task (owned, persisted)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(owner_id: Uuid, input: NewTask) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_completed(self.completed)
    }

    /// Apply an already-validated patch and bump `updated_at`.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(desc) = patch.description {
            self.description = (!desc.is_empty()).then_some(desc);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = now();
    }
}

// ---------------------------------------------------------------------------
// LocalTask (in-memory shell)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalTask {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocalTask {
    pub fn new(id: u64, input: NewTask) -> Self {
        let now = now();
        Self {
            id,
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_completed(self.completed)
    }
}
