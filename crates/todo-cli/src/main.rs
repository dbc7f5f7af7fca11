mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use cmd::serve::ServeArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "todo",
    about = "Todo manager: an in-memory interactive shell and an authenticated task API",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .todo/)
    #[arg(long, global = true, env = "TODO_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive in-memory shell (the default)
    Shell {
        /// Skip the welcome banner
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Run the HTTP API server
    Serve {
        /// Port to listen on (overrides config and TODO_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Address to bind (overrides config and TODO_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// SQLite database file (overrides config and TODO_DATABASE)
        #[arg(long)]
        database: Option<PathBuf>,
        /// Keep everything in memory; nothing survives a restart
        #[arg(long, conflicts_with = "database")]
        ephemeral: bool,
    },

    /// Manage .todo/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Some(Commands::Serve { .. }) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        None => cmd::shell::run(false, cli.json),
        Some(Commands::Shell { quiet }) => cmd::shell::run(quiet, cli.json),
        Some(Commands::Serve {
            port,
            bind,
            database,
            ephemeral,
        }) => cmd::serve::run(
            &root,
            ServeArgs {
                port,
                bind,
                database,
                ephemeral,
            },
        ),
        Some(Commands::Config { subcommand }) => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
