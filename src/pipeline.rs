//! Pipelines of `|`-separated stages.
//!
//! `a | b | c` becomes a right-leaning process tree. The shell forks one
//! orchestrating process for the whole pipeline. That process creates a pipe, forks
//! a producer running `a` with its stdout on the write end, moves the read end onto
//! its own stdin and runs `b | c` the same way. Stages therefore run concurrently,
//! and each orchestrator waits only for its own children.
//!
//! An `exit` in a head stage does not stop the stages after it; its status is only
//! seen once the whole pipeline has finished.

use crate::command::Status;
use crate::env::Environment;
use crate::process;
use crate::redirect;
use crate::tokens::{self, Tokens};
use anyhow::{Context, Result};
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::unistd::{close, pipe};
use std::os::fd::IntoRawFd;

/// Run one statement.
///
/// A statement without `|` runs through the redirection stage in the current
/// process, so built-ins such as `cd` affect the shell itself.
pub fn execute(env: &mut Environment, statement: &Tokens) -> Result<Status> {
    let Some((head, rest)) = statement.split_first_on(tokens::PIPE) else {
        return redirect::execute(env, statement);
    };

    log::debug!("pipeline {:?} | {:?}", head.as_slice(), rest.as_slice());
    process::run_branch(|| connect(env, &head, &rest))
}

/// Body of an orchestrating process: feed `head` into `rest` through a fresh pipe.
fn connect(env: &mut Environment, head: &Tokens, rest: &Tokens) -> Result<Status> {
    let (read_end, write_end) = pipe().context("cannot create pipe")?;
    let (read_end, write_end) = (read_end.into_raw_fd(), write_end.into_raw_fd());

    let producer = process::spawn_branch(|| {
        close(read_end).context("cannot close pipe read end")?;
        process::rebind(write_end, STDOUT_FILENO)?;
        redirect::execute(env, head)
    })?;
    log::debug!("stage {:?} started as {producer}", head.as_slice());

    close(write_end).context("cannot close pipe write end")?;

    let consumed = if rest.is_empty() {
        let _ = close(read_end);
        println!("Broken pipe");
        Status::Continue
    } else {
        process::rebind(read_end, STDIN_FILENO)?;
        let status = execute(env, rest)?;
        // Nothing reads the pipe from here on; a producer still writing gets EPIPE.
        let _ = close(STDIN_FILENO);
        status
    };

    let produced = process::wait_branch(producer)?;
    if produced.is_exit() || consumed.is_exit() {
        Ok(Status::Exit)
    } else {
        Ok(Status::Continue)
    }
}
