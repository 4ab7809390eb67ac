//! Owned token sequences passed between the stages of the executor.

/// Separates statements on one line.
pub const SEQUENCE: &str = ";";
/// Joins two pipeline stages.
pub const PIPE: &str = "|";
/// Reads standard input from a file.
pub const REDIRECT_IN: &str = "<";
/// Writes standard output to a file.
pub const REDIRECT_OUT: &str = ">";

/// Returns true for tokens the lexer always emits on their own.
pub fn is_operator(ch: char) -> bool {
    matches!(ch, ';' | '|' | '<' | '>')
}

/// An ordered sequence of owned tokens.
///
/// Every split produces new, independently owned sequences, so a stage can hand a
/// slice of its input to a child process without sharing anything with its caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    items: Vec<String>,
}

impl Tokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token to the back of the sequence.
    pub fn push(&mut self, token: impl Into<String>) {
        self.items.push(token.into());
    }

    /// Copy of the token at `idx`, if present.
    pub fn get(&self, idx: usize) -> Option<String> {
        self.items.get(idx).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    /// Split at every occurrence of `op`, dropping the operator itself.
    ///
    /// Empty segments are kept (`a ; ; b` yields three segments) so callers decide
    /// what an empty statement or stage means.
    pub fn split_on(&self, op: &str) -> Vec<Tokens> {
        self.items
            .split(|token| token == op)
            .map(|segment| segment.iter().cloned().collect())
            .collect()
    }

    /// Split at the first occurrence of `op` into the part before and the part after.
    ///
    /// Returns `None` when `op` does not occur.
    pub fn split_first_on(&self, op: &str) -> Option<(Tokens, Tokens)> {
        let idx = self.items.iter().position(|token| token == op)?;
        let head = self.items[..idx].iter().cloned().collect();
        let rest = self.items[idx + 1..].iter().cloned().collect();
        Some((head, rest))
    }
}

impl FromIterator<String> for Tokens {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for Tokens {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

impl IntoIterator for Tokens {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tokens {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
