use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TODO_DIR: &str = ".todo";
pub const CONFIG_FILE: &str = ".todo/config.yaml";
pub const DEFAULT_DATABASE_FILE: &str = ".todo/todo.db";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn todo_dir(root: &Path) -> PathBuf {
    root.join(TODO_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the database location. Relative paths are anchored at `root`.
pub fn database_path(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}
