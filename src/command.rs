//! Execution status and command classification shared by every executor stage.

/// Control signal returned by every stage of the executor.
///
/// Forked branches report it to their parent as the process exit code, so it
/// crosses process boundaries unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Keep going with the next statement or stage.
    Continue,
    /// Terminate the whole session.
    Exit,
}

impl Status {
    /// Exit code used when a forked branch reports this status.
    pub fn code(self) -> i32 {
        match self {
            Status::Continue => 0,
            Status::Exit => 1,
        }
    }

    /// Interpret the exit code of a forked branch.
    pub fn from_code(code: i32) -> Self {
        if code == Status::Exit.code() {
            Status::Exit
        } else {
            Status::Continue
        }
    }

    pub fn is_exit(self) -> bool {
        self == Status::Exit
    }
}

/// Built-in directives handled inside the shell process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Source,
    Exit,
    Prev,
    Help,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Cd,
        Builtin::Source,
        Builtin::Exit,
        Builtin::Prev,
        Builtin::Help,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Source => "source",
            Builtin::Exit => "exit",
            Builtin::Prev => "prev",
            Builtin::Help => "help",
        }
    }

    /// Usage line and description printed by `help`.
    pub fn usage(self) -> (&'static str, &'static str) {
        match self {
            Builtin::Cd => ("cd [/file/path/]", "changes the current working directory"),
            Builtin::Source => ("source [file.txt]", "executes a script"),
            Builtin::Exit => ("exit", "leaves the shell"),
            Builtin::Prev => (
                "prev",
                "prints the previous command line and executes it again. cannot be executed in a sequence",
            ),
            Builtin::Help => ("help", "explains all of the built-in commands"),
        }
    }
}

/// What the first token of an atom refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Builtin(Builtin),
    External,
}

impl Command {
    /// Classify a command name by exact, case-sensitive match.
    pub fn from_name(name: &str) -> Self {
        Builtin::ALL
            .into_iter()
            .find(|builtin| builtin.name() == name)
            .map_or(Command::External, Command::Builtin)
    }
}
