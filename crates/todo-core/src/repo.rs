//! Persistence contracts and their SQLite implementation.
//!
//! Every task operation is scoped by owner: a task id that belongs to another
//! user is indistinguishable from one that does not exist.

use crate::error::{Result, TodoError};
use crate::task::{NewTask, Task, TaskPatch};
use crate::types::TaskFilter;
use crate::user::User;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

pub trait TaskRepository {
    fn create_task(&self, owner_id: Uuid, input: NewTask) -> Result<Task>;
    /// Owner's tasks, newest first.
    fn list_tasks(&self, owner_id: Uuid, filter: TaskFilter) -> Result<Vec<Task>>;
    fn get_task(&self, owner_id: Uuid, id: Uuid) -> Result<Task>;
    /// Apply a validated patch. Callers run `TaskPatch::validated` first.
    fn update_task(&self, owner_id: Uuid, id: Uuid, patch: TaskPatch) -> Result<Task>;
    fn delete_task(&self, owner_id: Uuid, id: Uuid) -> Result<()>;
}

pub trait UserRepository {
    fn create_user(&self, email: &str, password_hash: &str) -> Result<User>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
}

/// SQLite-backed repository over a migrated connection.
pub struct SqliteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

const TASK_COLUMNS: &str =
    "id, owner_id, title, description, completed, created_at, updated_at";

impl TaskRepository for SqliteRepository<'_> {
    fn create_task(&self, owner_id: Uuid, input: NewTask) -> Result<Task> {
        let task = Task::new(owner_id, input);
        self.conn.execute(
            "INSERT INTO tasks (id, owner_id, title, description, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id.to_string(),
                task.owner_id.to_string(),
                task.title,
                task.description,
                task.completed,
                fmt_ts(task.created_at),
                fmt_ts(task.updated_at),
            ],
        )?;
        Ok(task)
    }

    fn list_tasks(&self, owner_id: Uuid, filter: TaskFilter) -> Result<Vec<Task>> {
        let owner = owner_id.to_string();
        let rows = match filter.completed_value() {
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ?1
                     ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map(params![owner], raw_task)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            Some(completed) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ?1 AND completed = ?2
                     ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map(params![owner, completed], raw_task)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        rows.into_iter().map(RawTask::into_task).collect()
    }

    fn get_task(&self, owner_id: Uuid, id: Uuid) -> Result<Task> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND owner_id = ?2"),
                params![id.to_string(), owner_id.to_string()],
                raw_task,
            )
            .optional()?
            .ok_or_else(|| TodoError::TaskNotFound(id.to_string()))?
            .into_task()
    }

    fn update_task(&self, owner_id: Uuid, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let mut task = self.get_task(owner_id, id)?;
        task.apply(patch);
        self.conn.execute(
            "UPDATE tasks SET title = ?3, description = ?4, completed = ?5, updated_at = ?6
             WHERE id = ?1 AND owner_id = ?2",
            params![
                task.id.to_string(),
                task.owner_id.to_string(),
                task.title,
                task.description,
                task.completed,
                fmt_ts(task.updated_at),
            ],
        )?;
        Ok(task)
    }

    fn delete_task(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner_id.to_string()],
        )?;
        if removed == 0 {
            return Err(TodoError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }
}

impl UserRepository for SqliteRepository<'_> {
    fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let user = User::new(email, password_hash);
        let inserted = self.conn.execute(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email) DO NOTHING",
            params![
                user.id.to_string(),
                user.email,
                user.password_hash,
                fmt_ts(user.created_at),
            ],
        )?;
        if inserted == 0 {
            return Err(TodoError::EmailTaken);
        }
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
                params![email],
                raw_user,
            )
            .optional()?
            .map(RawUser::into_user)
            .transpose()
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE id = ?1",
                params![id.to_string()],
                raw_user,
            )
            .optional()?
            .map(RawUser::into_user)
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Timestamps are stored as fixed-width RFC 3339 so text order is time order.
fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TodoError::CorruptRecord(format!("timestamp '{raw}': {e}")))
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| TodoError::CorruptRecord(format!("id '{raw}': {e}")))
}

struct RawTask {
    id: String,
    owner_id: String,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: String,
    updated_at: String,
}

fn raw_task(row: &Row<'_>) -> rusqlite::Result<RawTask> {
    Ok(RawTask {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        completed: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl RawTask {
    fn into_task(self) -> Result<Task> {
        Ok(Task {
            id: parse_uuid(&self.id)?,
            owner_id: parse_uuid(&self.owner_id)?,
            title: self.title,
            description: self.description,
            completed: self.completed,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

struct RawUser {
    id: String,
    email: String,
    password_hash: String,
    created_at: String,
}

fn raw_user(row: &Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl RawUser {
    fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_uuid(&self.id)?,
            email: self.email,
            password_hash: self.password_hash,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}
