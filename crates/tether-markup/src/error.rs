use std::fmt;

/// A parse error from a binding string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// The offending token, when the error is about a specific one.
    pub token: Option<String>,
    /// 1-based column (in characters) where the error occurred.
    pub col: usize,
}

impl ParseError {
    pub(crate) fn new(msg: impl Into<String>, col: usize) -> Self {
        Self { message: msg.into(), token: None, col }
    }

    pub(crate) fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding parse error at column {}: {}", self.col, self.message)
    }
}

impl std::error::Error for ParseError {}
