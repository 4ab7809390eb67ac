//! A small line-oriented Unix shell.
//!
//! A command line is split into `;`-separated statements, each statement into
//! `|`-connected stages, and each stage into an atom plus `<`/`>` redirections.
//! Stages run as forked processes joined by pipes; atoms are either one of the
//! built-ins (`cd`, `source`, `exit`, `prev`, `help`) or a program found on `PATH`.
//!
//! The main entry point is [`Interpreter`]. The public modules [`lexer`] and
//! [`tokens`] expose the tokenizer and token buffer, [`env`] the session state
//! that carries the previous command between lines.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
mod external;
mod interpreter;
pub mod lexer;
pub mod logging;
mod pipeline;
mod process;
mod redirect;
pub mod tokens;

pub use config::Config;
pub use interpreter::{Interpreter, execute_line};
