use crate::builtin;
use crate::command::Status;
use crate::config::Config;
use crate::env::Environment;
use crate::lexer;
use crate::pipeline;
use crate::process;
use crate::tokens::{self, Tokens};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;

/// A line-oriented shell session.
///
/// The interpreter owns the session [`Environment`] and the [`Config`] that shapes
/// its interactive surface. Lines run through the same path whether they come
/// from the terminal, from `-c`, or from a script.
///
/// Example
/// ```no_run
/// use minishell::{Config, Interpreter};
/// let mut sh = Interpreter::new(Config::default());
/// sh.run_command("echo hello | tr a-z A-Z");
/// ```
pub struct Interpreter {
    env: Environment,
    config: Config,
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        Self {
            env: Environment::new(),
            config,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Run one command line, recording it for `prev`.
    pub fn run_command(&mut self, line: &str) -> Status {
        let line = self.env.take_line(line);
        run_text(&mut self.env, &line.text)
    }

    /// Run a script file as `source <path>` would.
    pub fn run_script(&mut self, path: &Path) -> Status {
        let atom: Tokens = ["source".to_string(), path.to_string_lossy().into_owned()]
            .into_iter()
            .collect();
        builtin::execute_atom(&mut self.env, &atom).unwrap_or_else(|err| {
            process::report(&err);
            Status::Continue
        })
    }

    /// Interactive loop over standard input.
    pub fn repl(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        self.read_eval_loop(stdin.lock())
    }

    /// Prompt, read and run lines until `exit` or end of input.
    ///
    /// A replayed `prev` line is echoed before it runs.
    pub fn read_eval_loop<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        if let Some(greeting) = self.config.greeting() {
            println!("{greeting}");
        }

        loop {
            print!("{}", self.config.prompt);
            process::flush_stdout();

            let mut raw = Vec::new();
            let read = input
                .read_until(b'\n', &mut raw)
                .context("cannot read standard input")?;
            if read == 0 {
                println!();
                println!("Bye bye.");
                return Ok(());
            }

            let line = self.env.take_line(&String::from_utf8_lossy(&raw));
            if line.replayed {
                println!("{}", line.text);
            }
            if run_text(&mut self.env, &line.text).is_exit() {
                return Ok(());
            }
        }
    }
}

/// Tokenize and execute one already-normalized line.
///
/// Lexing errors are reported here and never end the session.
pub(crate) fn run_text(env: &mut Environment, text: &str) -> Status {
    let tokens = match lexer::split_into_tokens(text) {
        Ok(tokens) => tokens,
        Err(err) => {
            process::flush_stdout();
            eprintln!("minishell: syntax error: {err}");
            return Status::Continue;
        }
    };
    log::debug!("tokens: {:?}", tokens.as_slice());

    execute_line(env, &tokens)
}

/// Run the `;`-separated statements of a line in order.
///
/// Empty statements are skipped. A statement that fails is reported and the next
/// one runs; only a statement that ends the session stops the rest.
pub fn execute_line(env: &mut Environment, tokens: &Tokens) -> Status {
    for statement in tokens.split_on(tokens::SEQUENCE) {
        if statement.is_empty() {
            continue;
        }
        log::debug!("statement: {:?}", statement.as_slice());
        match pipeline::execute(env, &statement) {
            Ok(Status::Exit) => return Status::Exit,
            Ok(Status::Continue) => {}
            Err(err) => process::report(&err),
        }
    }
    Status::Continue
}

/// Run every line of a script through `prev` substitution and [`run_text`].
pub(crate) fn run_script<R: BufRead>(env: &mut Environment, mut script: R) -> Result<Status> {
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if script.read_until(b'\n', &mut raw).context("cannot read script")? == 0 {
            return Ok(Status::Continue);
        }

        let line = env.take_line(&String::from_utf8_lossy(&raw));
        if run_text(env, &line.text).is_exit() {
            return Ok(Status::Exit);
        }
        std::io::stdout().flush().ok();
    }
}
