//! Redirection of a single pipeline stage.
//!
//! `<` and `>` each take the following token as a file name; every other token
//! belongs to the atom. Redirections are applied left to right, each one in its
//! own forked layer wrapping the next, and the innermost layer runs the atom.

use crate::builtin;
use crate::command::Status;
use crate::env::Environment;
use crate::process;
use crate::tokens::{self, Tokens};
use anyhow::{Context, Result, bail};
use nix::fcntl::{OFlag, open};
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::stat::Mode;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Redirection {
    Input(String),
    Output(String),
}

impl Redirection {
    /// Open the file and bind it to the matching standard stream of this process.
    fn bind(&self) -> Result<()> {
        let (path, fd, target) = match self {
            Redirection::Input(path) => {
                let fd = open(path.as_str(), OFlag::O_RDONLY, Mode::empty());
                (path, fd, STDIN_FILENO)
            }
            Redirection::Output(path) => {
                let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
                let flags = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
                (path, open(path.as_str(), flags, mode), STDOUT_FILENO)
            }
        };
        let fd = fd.with_context(|| path.clone())?;
        log::debug!("bound {path} to descriptor {target}");
        process::rebind(fd, target)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Stage {
    atom: Tokens,
    redirections: Vec<Redirection>,
}

fn parse(tokens: &Tokens) -> Result<Stage> {
    let mut stage = Stage::default();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        let op = token.as_str();
        if op != tokens::REDIRECT_IN && op != tokens::REDIRECT_OUT {
            stage.atom.push(token.as_str());
            continue;
        }

        let file = match iter.next() {
            Some(file) if file != tokens::REDIRECT_IN && file != tokens::REDIRECT_OUT => file,
            _ => bail!("syntax error: expected a file name after `{op}`"),
        };
        stage.redirections.push(if op == tokens::REDIRECT_IN {
            Redirection::Input(file.clone())
        } else {
            Redirection::Output(file.clone())
        });
    }

    Ok(stage)
}

/// Run one pipeline stage with its redirections applied.
///
/// Without redirections the atom runs directly in the current process. A malformed
/// redirection is reported and the stage is skipped.
pub fn execute(env: &mut Environment, tokens: &Tokens) -> Result<Status> {
    let stage = match parse(tokens) {
        Ok(stage) => stage,
        Err(err) => {
            process::report(&err);
            return Ok(Status::Continue);
        }
    };

    if stage.redirections.is_empty() {
        return builtin::execute_atom(env, &stage.atom);
    }
    apply_chain(env, &stage.atom, &stage.redirections)
}

fn apply_chain(env: &mut Environment, atom: &Tokens, redirections: &[Redirection]) -> Result<Status> {
    let Some((first, rest)) = redirections.split_first() else {
        return builtin::execute_atom(env, atom);
    };

    process::run_branch(|| {
        first.bind()?;
        apply_chain(env, atom, rest)
    })
}
