//! Line-oriented command parsing for the interactive shell.
//!
//! A line is tokenized on whitespace; single- or double-quoted segments form
//! one argument, and inside double quotes a backslash escapes the next char.
//! The first token is the verb. Numeric shortcuts `1`..`7` follow the order
//! of the classic menu (add, list, update, delete, complete, incomplete, exit).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        title: String,
        description: Option<String>,
    },
    List,
    Update {
        id: u64,
        title: Option<String>,
        description: Option<String>,
    },
    Delete {
        id: u64,
    },
    Complete {
        id: u64,
    },
    Incomplete {
        id: u64,
    },
    Help,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnterminatedQuote,
    UnknownVerb(String),
    Usage(&'static str),
    InvalidId(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnterminatedQuote => f.write_str("unterminated quote"),
            CommandError::UnknownVerb(v) => {
                write!(f, "unknown command '{v}' (type 'help' for a list of commands)")
            }
            CommandError::Usage(usage) => write!(f, "usage: {usage}"),
            CommandError::InvalidId(raw) => {
                write!(f, "invalid task id '{raw}': must be a positive number")
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub const USAGE: &[(&str, &str)] = &[
    ("add <title> [description]", "Add a task"),
    ("list", "Show all tasks"),
    ("update <id> <title|\"\"> [description]", "Change title and/or description"),
    ("delete <id>", "Delete a task"),
    ("complete <id>", "Mark a task completed"),
    ("incomplete <id>", "Mark a task incomplete"),
    ("help", "Show this help"),
    ("exit", "Leave the shell"),
];

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let tokens = tokenize(line)?;
    let Some((verb, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "add" | "1" => match args {
            [title] => Command::Add {
                title: title.clone(),
                description: None,
            },
            [title, description] => Command::Add {
                title: title.clone(),
                description: Some(description.clone()),
            },
            _ => return Err(CommandError::Usage("add <title> [description]")),
        },
        "list" | "ls" | "2" => {
            if !args.is_empty() {
                return Err(CommandError::Usage("list"));
            }
            Command::List
        }
        "update" | "edit" | "3" => match args {
            [id, title] => Command::Update {
                id: parse_id(id)?,
                title: non_blank(title),
                description: None,
            },
            [id, title, description] => Command::Update {
                id: parse_id(id)?,
                title: non_blank(title),
                description: non_blank(description),
            },
            _ => {
                return Err(CommandError::Usage(
                    "update <id> <title|\"\"> [description]",
                ))
            }
        },
        "delete" | "rm" | "4" => Command::Delete {
            id: single_id(args, "delete <id>")?,
        },
        "complete" | "done" | "5" => Command::Complete {
            id: single_id(args, "complete <id>")?,
        },
        "incomplete" | "undo" | "6" => Command::Incomplete {
            id: single_id(args, "incomplete <id>")?,
        },
        "help" | "?" => Command::Help,
        "exit" | "quit" | "7" => Command::Exit,
        other => return Err(CommandError::UnknownVerb(other.to_string())),
    };
    Ok(Some(cmd))
}

/// Split a line into arguments, honouring quotes.
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Distinguishes `""` (an explicit empty argument) from no token at all.
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => return Err(CommandError::UnterminatedQuote),
                        },
                        Some(other) => current.push(other),
                        None => return Err(CommandError::UnterminatedQuote),
                    }
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(other) => current.push(other),
                        None => return Err(CommandError::UnterminatedQuote),
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            other => {
                in_token = true;
                current.push(other);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_id(raw: &str) -> Result<u64, CommandError> {
    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CommandError::InvalidId(raw.to_string())),
    }
}

fn single_id(args: &[String], usage: &'static str) -> Result<u64, CommandError> {
    match args {
        [id] => parse_id(id),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn non_blank(s: &str) -> Option<String> {
    (!s.trim().is_empty()).then(|| s.to_string())
}
