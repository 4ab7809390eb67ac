use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// The exact text that replays the previous command line.
pub const PREV: &str = "prev";

/// Deepest allowed chain of nested `source` invocations.
pub const MAX_SOURCE_DEPTH: usize = 64;

/// A normalized input line ready for tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    /// Effective text to execute.
    pub text: String,
    /// Set when the raw line was `prev` and `text` is the replayed command.
    pub replayed: bool,
}

/// Per-session state threaded through the input loop and every `source` loop.
///
/// The environment contains:
/// - `vars`: variable overrides consulted before the process environment (e.g. `HOME`).
/// - `previous_command`: raw text of the last line that was not `prev`.
/// - `source_depth`: how many `source` invocations are currently running.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub previous_command: String,
    pub source_depth: usize,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a variable, falling back to the process environment.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    pub fn home_dir(&self) -> Option<PathBuf> {
        self.get_var("HOME").map(PathBuf::from)
    }

    /// Strip the line terminator and apply `prev` substitution.
    ///
    /// A line that is exactly `prev` is replaced by the stored previous command,
    /// which stays untouched. Any other line becomes the new previous command.
    pub fn take_line(&mut self, raw: &str) -> InputLine {
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line == PREV {
            InputLine {
                text: self.previous_command.clone(),
                replayed: true,
            }
        } else {
            self.previous_command = line.to_string();
            InputLine {
                text: line.to_string(),
                replayed: false,
            }
        }
    }
}
