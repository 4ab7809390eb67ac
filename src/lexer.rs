//! Lexical analysis of a single command line.
//!
//! Words are separated by blanks. The operators `;`, `|`, `<` and `>` always form
//! a token of their own, whether or not they are surrounded by whitespace. Single
//! and double quotes group text (including blanks and operator characters) into
//! one word; the quotes themselves are removed.

use crate::tokens::{Tokens, is_operator};
use std::fmt;

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    UnfinishedQuote(char),
}

impl fmt::Display for LexingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexingError::UnfinishedQuote(quote) => write!(f, "unmatched {quote}"),
        }
    }
}

impl std::error::Error for LexingError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM<'a> {
    input: std::str::Chars<'a>,
    state: LexingState,
    buffer: String,
    out: Tokens,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &'a str) -> Self {
        LexingFSM {
            input: line.chars(),
            state: LexingState::Start,
            buffer: String::new(),
            out: Tokens::new(),
        }
    }

    /// Runs the machine over the whole input.
    ///
    /// A word that was opened (even by an empty pair of quotes) is emitted when a
    /// blank, an operator, or the end of input closes it.
    fn make_tokens(mut self) -> Result<Tokens, LexingError> {
        while let Some(ch) = self.input.next() {
            match self.state {
                LexingState::Start | LexingState::ReadingWord => self.handle_unquoted(ch),
                LexingState::ReadingSingleQuote => self.handle_quoted(ch, '\''),
                LexingState::ReadingDoubleQuote => self.handle_quoted(ch, '"'),
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote => return Err(LexingError::UnfinishedQuote('\'')),
            LexingState::ReadingDoubleQuote => return Err(LexingError::UnfinishedQuote('"')),
            _ => {}
        }

        self.finish_word();
        Ok(self.out)
    }

    fn handle_unquoted(&mut self, ch: char) {
        match ch {
            c if c.is_whitespace() => self.finish_word(),
            c if is_operator(c) => {
                self.finish_word();
                self.out.push(c.to_string());
            }
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            c => {
                self.buffer.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
    }

    fn handle_quoted(&mut self, ch: char, quote: char) {
        if ch == quote {
            self.state = LexingState::ReadingWord;
        } else {
            self.buffer.push(ch);
        }
    }

    fn finish_word(&mut self) {
        if self.state == LexingState::ReadingWord {
            self.out.push(std::mem::take(&mut self.buffer));
        }
        self.state = LexingState::Start;
    }
}

/// Splits one command line into tokens.
///
/// Returns `LexingError::UnfinishedQuote` if a quote is left open at the end of the
/// line.
pub fn split_into_tokens(line: &str) -> Result<Tokens, LexingError> {
    LexingFSM::new(line).make_tokens()
}
