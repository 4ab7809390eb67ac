use crate::command::{Builtin, Command, Status};
use crate::env::{Environment, MAX_SOURCE_DEPTH};
use crate::external::ExternalCommand;
use crate::interpreter;
use crate::tokens::Tokens;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::env;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// Built-in commands executed inside the shell process.
///
/// Arguments are parsed with [`argh`]; each built-in keeps the leading
/// arguments it needs and ignores the rest. Messages go to `stdout`.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Status>;
}

fn run<T: BuiltinCommand>(name: &str, args: &[String], env: &mut Environment) -> Result<Status> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let mut stdout = std::io::stdout();
    match T::from_args(&[name], &args) {
        Ok(cmd) => cmd.execute(&mut stdout, env),
        Err(EarlyExit { output, .. }) => {
            writeln!(stdout, "{}", output.trim_end())?;
            Ok(Status::Continue)
        }
    }
}

/// Run an atom: a built-in directive or an external program.
///
/// An empty atom does nothing.
pub fn execute_atom(env: &mut Environment, atom: &Tokens) -> Result<Status> {
    let Some((name, args)) = atom.as_slice().split_first() else {
        return Ok(Status::Continue);
    };

    match Command::from_name(name) {
        Command::Builtin(Builtin::Cd) => run::<Cd>(name, args, env),
        Command::Builtin(Builtin::Source) => run::<Source>(name, args, env),
        Command::Builtin(Builtin::Exit) => run::<Exit>(name, args, env),
        Command::Builtin(Builtin::Prev) => run::<Prev>(name, args, env),
        Command::Builtin(Builtin::Help) => run::<Help>(name, args, env),
        Command::External => ExternalCommand::new(atom.as_slice())?.execute(),
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// Only the first argument is used; without one, changes to `$HOME`.
pub struct Cd {
    #[argh(positional, greedy)]
    /// directory to switch to, followed by ignored arguments.
    pub args: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Status> {
        let cwd = match env::current_dir() {
            Ok(cwd) => cwd,
            Err(err) => {
                writeln!(stdout, "cd: cannot determine current directory: {err}")?;
                return Ok(Status::Continue);
            }
        };

        let target = self.args.into_iter().next();
        let Some(new_dir) = resolve_target(target.as_deref(), env.home_dir().as_deref(), &cwd)
        else {
            writeln!(stdout, "cd: HOME not set")?;
            return Ok(Status::Continue);
        };

        log::debug!("cd {}", new_dir.display());
        if let Err(err) = env::set_current_dir(&new_dir) {
            log::debug!("cd to {} failed: {err}", new_dir.display());
            let shown = match target {
                Some(target) => target,
                None => new_dir.display().to_string(),
            };
            writeln!(stdout, "cd: no such file or directory: {shown}")?;
        }
        Ok(Status::Continue)
    }
}

/// Resolve a `cd` argument against the home and current directories.
///
/// Rules, first match wins: no argument or `~` is home; a leading `/` is used
/// verbatim; a leading `~` is home followed by the rest; a leading `./` is the
/// current directory followed by the rest after the dot; anything else is the
/// current directory, a `/`, and the argument. Returns `None` when home is needed
/// but unknown.
pub fn resolve_target(target: Option<&str>, home: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    let Some(target) = target else {
        return home.map(Path::to_path_buf);
    };

    if target == "~" {
        home.map(Path::to_path_buf)
    } else if target.starts_with('/') {
        Some(PathBuf::from(target))
    } else if let Some(rest) = target.strip_prefix('~') {
        home.map(|home| concat(home, rest))
    } else if let Some(rest) = target.strip_prefix('.').filter(|rest| rest.starts_with('/')) {
        Some(concat(cwd, rest))
    } else {
        Some(concat(cwd, &format!("/{target}")))
    }
}

fn concat(base: &Path, suffix: &str) -> PathBuf {
    let mut joined = OsString::from(base.as_os_str());
    joined.push(suffix);
    PathBuf::from(joined)
}

#[derive(FromArgs)]
/// Execute the lines of a script file.
/// Only the first argument is used.
pub struct Source {
    #[argh(positional, greedy)]
    /// script to run, followed by ignored arguments.
    pub args: Vec<String>,
}

impl BuiltinCommand for Source {
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Status> {
        let Some(script) = self.args.into_iter().next() else {
            writeln!(stdout, "source: not enough arguments")?;
            return Ok(Status::Continue);
        };

        if env.source_depth >= MAX_SOURCE_DEPTH {
            writeln!(stdout, "source: {script}: nested too deeply")?;
            return Ok(Status::Continue);
        }

        let file = match File::open(&script) {
            Ok(file) => file,
            Err(err) => {
                writeln!(stdout, "source: {script}: {err}")?;
                return Ok(Status::Continue);
            }
        };

        log::debug!("sourcing {script} at depth {}", env.source_depth + 1);
        env.source_depth += 1;
        let result = interpreter::run_script(env, BufReader::new(file));
        env.source_depth -= 1;

        match result {
            Ok(status) => Ok(status),
            Err(err) => {
                log::debug!("source {script} stopped: {err:#}");
                writeln!(stdout, "source: {script}: {}", err.root_cause())?;
                Ok(Status::Continue)
            }
        }
    }
}

#[derive(FromArgs)]
/// Leave the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<Status> {
        writeln!(stdout, "Bye bye.")?;
        Ok(Status::Exit)
    }
}

/// Placeholder for `prev` inside a sequence.
///
/// The replay itself happens when the line is read, so reaching here is a no-op.
#[derive(FromArgs)]
pub struct Prev {
    #[argh(positional, greedy)]
    /// ignored.
    pub args: Vec<String>,
}

impl BuiltinCommand for Prev {
    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<Status> {
        log::debug!("prev cannot be executed in a sequence; ignored");
        Ok(Status::Continue)
    }
}

#[derive(FromArgs)]
/// List the built-in commands.
pub struct Help {
    #[argh(positional, greedy)]
    /// ignored.
    pub args: Vec<String>,
}

impl BuiltinCommand for Help {
    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<Status> {
        writeln!(stdout, "available commands:")?;
        for builtin in Builtin::ALL {
            let (usage, description) = builtin.usage();
            writeln!(stdout, " * {usage} - {description}")?;
        }
        Ok(Status::Continue)
    }
}
