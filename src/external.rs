use crate::command::Status;
use crate::process::{self, EXEC_FAILED};
use anyhow::{Context, Result};
use nix::unistd::execvp;
use std::ffi::CString;

/// Command that is not a builtin.
///
/// The program is looked up through `PATH` by `execvp` in a forked child; argv is
/// the full token list, command name included.
pub struct ExternalCommand {
    name: String,
    argv: Vec<CString>,
}

impl ExternalCommand {
    pub fn new(tokens: &[String]) -> Result<Self> {
        let name = tokens.first().cloned().unwrap_or_default();
        let argv = tokens
            .iter()
            .map(|token| CString::new(token.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("{name}: argument contains a NUL byte"))?;
        Ok(Self { name, argv })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the program to completion.
    ///
    /// A non-zero exit, including a failed exec, is reported as
    /// `[<name>]: command not found`; it never ends the session.
    pub fn execute(self) -> Result<Status> {
        let Some(program) = self.argv.first() else {
            return Ok(Status::Continue);
        };

        let pid = process::fork_child(|| {
            let err = match execvp(program, &self.argv) {
                Ok(never) => match never {},
                Err(err) => err,
            };
            log::debug!("exec {} failed: {err}", self.name);
            EXEC_FAILED
        })?;
        log::debug!("started {} as {pid}", self.name);

        let code = process::wait_for(pid)?;
        if code != 0 {
            log::debug!("{} exited with {code}", self.name);
            println!("[{}]: command not found", self.name);
        }
        Ok(Status::Continue)
    }
}
