//! The interactive in-memory todo shell.
//!
//! Every session starts with an empty `TodoStore`; nothing is written to
//! disk. Bad input is reported with an `Error: ` line and the loop keeps
//! reading until `exit` or end of input.

use crate::output::{render_table, write_json};
use anyhow::Result;
use std::io::{BufRead, IsTerminal, Write};
use todo_core::command::{self, Command, USAGE};
use todo_core::store::TodoStore;
use todo_core::task::LocalTask;

const PROMPT: &str = "todo> ";

pub fn run(quiet: bool, json: bool) -> Result<()> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut shell = Shell {
        store: TodoStore::new(),
        out: std::io::stdout().lock(),
        json,
        prompt: interactive,
    };
    if !quiet {
        shell.banner()?;
    }
    shell.run(stdin.lock())
}

struct Shell<W: Write> {
    store: TodoStore,
    out: W,
    json: bool,
    prompt: bool,
}

/// Whether the loop should keep reading.
enum Flow {
    Continue,
    Exit,
}

impl<W: Write> Shell<W> {
    fn banner(&mut self) -> Result<()> {
        writeln!(self.out, "Todo (in-memory session, nothing is saved)")?;
        writeln!(self.out, "Type 'help' for commands, 'exit' to quit.")?;
        Ok(())
    }

    fn run<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            if self.prompt {
                write!(self.out, "{PROMPT}")?;
                self.out.flush()?;
            }
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                tracing::debug!("end of input");
                break;
            }
            let Ok(line) = std::str::from_utf8(&buf) else {
                self.error(&"input is not valid UTF-8")?;
                continue;
            };
            let line = line.trim_end_matches(['\n', '\r']);
            if let Flow::Exit = self.handle_line(line)? {
                break;
            }
        }
        if !self.json {
            writeln!(self.out, "Goodbye!")?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Execute one line. Only I/O failures on the output escape; command and
    /// domain errors are printed and the session continues.
    fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let cmd = match command::parse_line(line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                self.error(&e)?;
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?cmd, "shell command");

        match cmd {
            Command::Exit => return Ok(Flow::Exit),
            Command::Help => self.help()?,
            Command::List => self.list()?,
            Command::Add { title, description } => {
                match self.store.add(&title, description.as_deref()) {
                    Ok(task) => {
                        let task = task.clone();
                        self.task_result(&format!("Task added with ID: {}", task.id), &task)?
                    }
                    Err(e) => self.error(&e)?,
                }
            }
            Command::Update {
                id,
                title,
                description,
            } => match self
                .store
                .update(id, title.as_deref(), description.as_deref())
            {
                Ok(task) => {
                    let task = task.clone();
                    self.task_result(&format!("Task {id} updated"), &task)?
                }
                Err(e) => self.error(&e)?,
            },
            Command::Delete { id } => match self.store.delete(id) {
                Ok(task) => self.task_result(&format!("Task {id} deleted"), &task)?,
                Err(e) => self.error(&e)?,
            },
            Command::Complete { id } => match self.store.complete(id) {
                Ok(task) => {
                    let task = task.clone();
                    self.task_result(&format!("Task {id} marked complete"), &task)?
                }
                Err(e) => self.error(&e)?,
            },
            Command::Incomplete { id } => match self.store.incomplete(id) {
                Ok(task) => {
                    let task = task.clone();
                    self.task_result(&format!("Task {id} marked incomplete"), &task)?
                }
                Err(e) => self.error(&e)?,
            },
        }
        Ok(Flow::Continue)
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    fn error(&mut self, e: &dyn std::fmt::Display) -> Result<()> {
        if self.json {
            let value = serde_json::json!({ "success": false, "message": e.to_string() });
            write_json(&mut self.out, &value)
        } else {
            writeln!(self.out, "Error: {e}")?;
            Ok(())
        }
    }

    fn task_result(&mut self, message: &str, task: &LocalTask) -> Result<()> {
        if self.json {
            let value = serde_json::json!({
                "success": true,
                "message": message,
                "data": task,
            });
            return write_json(&mut self.out, &value);
        }
        writeln!(self.out, "{message}")?;
        writeln!(self.out, "  {} {}", task.status().marker(), task.title)?;
        if let Some(desc) = &task.description {
            writeln!(self.out, "      {desc}")?;
        }
        Ok(())
    }

    fn list(&mut self) -> Result<()> {
        if self.json {
            let value = serde_json::json!({
                "success": true,
                "message": self.store.summary(),
                "data": self.store.list(),
            });
            return write_json(&mut self.out, &value);
        }
        if self.store.is_empty() {
            writeln!(self.out, "No tasks yet. Use 'add <title>' to create one.")?;
            return Ok(());
        }
        let rows: Vec<Vec<String>> = self
            .store
            .list()
            .into_iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.status().marker().to_string(),
                    t.title.clone(),
                    t.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        let table = render_table(&["ID", "STATUS", "TITLE", "DESCRIPTION"], &rows);
        writeln!(self.out, "{}", self.store.summary())?;
        write!(self.out, "{table}")?;
        Ok(())
    }

    fn help(&mut self) -> Result<()> {
        writeln!(self.out, "Commands:")?;
        let width = USAGE.iter().map(|(u, _)| u.len()).max().unwrap_or(0);
        for (usage, about) in USAGE {
            writeln!(self.out, "  {usage:width$}  {about}")?;
        }
        Ok(())
    }
}
