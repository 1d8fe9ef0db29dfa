//! The lexed-token boundary between a front end and the tree builder.
//!
//! A token is a kind tag plus an optional literal payload. The tag vocabulary
//! is fixed by `Ast::make_node`: `ID`, `INT`, `STR`, the statement keywords
//! `new` and `cmd`, the operator tags (`PLUS`, `MINUS`, `MULT`, `DIV`, `AMP`,
//! `PIPE`), the separators `:` `=` `;`, and the brace characters.

use serde::{Deserialize, Serialize};

/// One lexed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: String,
    pub value: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// A token with no payload (punctuation, keywords).
    pub fn bare(kind: impl Into<String>) -> Self {
        Self::new(kind, "")
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}:{}", self.kind, self.value)
        }
    }
}
