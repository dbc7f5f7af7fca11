//! SQLite connection bootstrap.
//!
//! Every connection handed out here has `foreign_keys=ON`, a busy timeout,
//! and all migrations applied. Nothing reads or writes application rows
//! before that.

pub mod migrations;

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Open (creating if needed) the database file at `path`.
pub fn open_db(path: &Path) -> Result<Connection> {
    let started = Instant::now();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        crate::io::ensure_dir(parent)?;
    }
    let mut conn = Connection::open(path)?;
    bootstrap(&mut conn)?;
    tracing::info!(
        path = %path.display(),
        duration_ms = started.elapsed().as_millis() as u64,
        "database opened"
    );
    Ok(conn)
}

/// Open a private in-memory database. Used by tests and `--ephemeral` serving.
pub fn open_db_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap(&mut conn)?;
    tracing::debug!("in-memory database opened");
    Ok(conn)
}

fn bootstrap(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    migrations::apply_migrations(conn)
}
