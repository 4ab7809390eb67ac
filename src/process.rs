//! Fork, wait and descriptor plumbing shared by the pipeline, redirection and
//! external-command stages.

use crate::command::Status;
use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, close, dup2, fork};
use std::io::Write;
use std::os::fd::RawFd;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Exit code of a child whose program image could not be replaced.
pub const EXEC_FAILED: i32 = 127;

/// Exit code of a child whose body panicked.
const CHILD_PANICKED: i32 = 101;

/// Fork a child that runs `body` and exits with the code it returns.
///
/// Standard output is flushed first so text buffered in the parent is never
/// written twice. The child gets the default `SIGPIPE` disposition back, so it and
/// any program it executes stop quietly when their reader goes away. The child
/// never returns into the caller, not even on panic.
pub fn fork_child<F: FnOnce() -> i32>(body: F) -> Result<Pid> {
    flush_stdout();
    // SAFETY: the shell is single-threaded, and the child only runs `body` before exiting.
    match unsafe { fork() }.context("fork failed")? {
        ForkResult::Parent { child } => Ok(child),
        ForkResult::Child => {
            // SAFETY: restoring the default disposition installs no handler.
            let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };
            let code = catch_unwind(AssertUnwindSafe(body)).unwrap_or(CHILD_PANICKED);
            flush_stdout();
            std::process::exit(code)
        }
    }
}

/// Block until the given child terminates and return its exit code.
///
/// A child killed by a signal is reported the way shells do, as `128 + signal`.
pub fn wait_for(pid: Pid) -> Result<i32> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(128 + signal as i32),
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(err) => return Err(err).with_context(|| format!("waiting for process {pid} failed")),
        }
    }
}

/// Fork a branch of the executor.
///
/// The child reports its `Status` as exit code. An error inside the branch is
/// printed there and ends only that branch.
pub fn spawn_branch<F: FnOnce() -> Result<Status>>(body: F) -> Result<Pid> {
    fork_child(|| match body() {
        Ok(status) => status.code(),
        Err(err) => {
            report(&err);
            Status::Continue.code()
        }
    })
}

/// Wait for a branch forked by [`spawn_branch`] and decode its status.
pub fn wait_branch(pid: Pid) -> Result<Status> {
    wait_for(pid).map(Status::from_code)
}

/// Fork a branch and wait for it.
pub fn run_branch<F: FnOnce() -> Result<Status>>(body: F) -> Result<Status> {
    let pid = spawn_branch(body)?;
    log::debug!("waiting for branch {pid}");
    wait_branch(pid)
}

/// Make `target` refer to the same open file as `fd`, then close `fd`.
pub fn rebind(fd: RawFd, target: RawFd) -> Result<()> {
    if fd != target {
        dup2(fd, target).with_context(|| format!("cannot bind descriptor {fd} to {target}"))?;
        close(fd).with_context(|| format!("cannot close descriptor {fd}"))?;
    }
    Ok(())
}

/// Print an error that ended a branch.
pub fn report(err: &anyhow::Error) {
    log::debug!("branch failed: {err:?}");
    flush_stdout();
    eprintln!("minishell: {err:#}");
}

pub fn flush_stdout() {
    let _ = std::io::stdout().flush();
}
