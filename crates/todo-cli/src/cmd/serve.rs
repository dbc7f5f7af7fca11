use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use todo_core::config::{Config, WarnLevel};

/// Command-line overrides; they win over both the config file and `TODO_*`.
#[derive(Debug, Default)]
pub struct ServeArgs {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub database: Option<PathBuf>,
    pub ephemeral: bool,
}

pub fn run(root: &Path, args: ServeArgs) -> Result<()> {
    let config = effective_config(root, &args)?;

    let warnings = config.validate();
    for w in &warnings {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => tracing::error!("{}", w.message),
        }
    }
    if Config::has_errors(&warnings) {
        bail!("refusing to start: config has errors (run 'todo config validate')");
    }

    if args.ephemeral {
        tracing::info!("using an in-memory database; data is lost on exit");
    } else {
        tracing::info!(path = %config.database_path(root).display(), "using database");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(todo_server::serve(root, &config, args.ephemeral))
}

fn effective_config(root: &Path, args: &ServeArgs) -> Result<Config> {
    let mut config = Config::load_or_default(root).context("failed to load config")?;
    config.apply_env().context("invalid environment override")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(db) = &args.database {
        config.database.path = db.clone();
    }
    Ok(config)
}
