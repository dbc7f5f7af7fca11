use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    /// Checkbox marker used by the shell listing.
    pub fn marker(self) -> &'static str {
        match self {
            TaskStatus::Pending => "[ ]",
            TaskStatus::Completed => "[x]",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskFilter
// ---------------------------------------------------------------------------

/// Listing filter accepted by `GET /api/v1/tasks?status=...`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Pending => "pending",
            TaskFilter::Completed => "completed",
        }
    }

    /// Value the `completed` column must hold, or `None` for no restriction.
    pub fn completed_value(self) -> Option<bool> {
        match self {
            TaskFilter::All => None,
            TaskFilter::Pending => Some(false),
            TaskFilter::Completed => Some(true),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskFilter {
    type Err = crate::error::TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "pending" | "incomplete" => Ok(TaskFilter::Pending),
            "completed" | "complete" | "done" => Ok(TaskFilter::Completed),
            other => Err(crate::error::TodoError::validation(format!(
                "unknown status filter '{other}': expected all, pending, or completed"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_marker() {
        assert_eq!(TaskStatus::from_completed(true).marker(), "[x]");
        assert_eq!(TaskStatus::from_completed(false).marker(), "[ ]");
    }

    #[test]
    fn filter_parses_aliases() {
        assert_eq!("ALL".parse::<TaskFilter>().unwrap(), TaskFilter::All);
        assert_eq!("incomplete".parse::<TaskFilter>().unwrap(), TaskFilter::Pending);
        assert_eq!("done".parse::<TaskFilter>().unwrap(), TaskFilter::Completed);
        assert!("archived".parse::<TaskFilter>().is_err());
    }

    #[test]
    fn filter_serde_snake_case() {
        let f: TaskFilter = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(f, TaskFilter::Pending);
        assert_eq!(serde_json::to_string(&TaskFilter::Completed).unwrap(), "\"completed\"");
    }
}
