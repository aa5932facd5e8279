//! Session domain model.

use crate::error::{GpdiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ID_PREFIX: &str = "chat_";

/// Identity of a saved conversation.
///
/// Identities are issued from a monotonic counter and rendered as `chat_N`;
/// the same string names the session's record on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }

    /// The identity issued after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ID_PREFIX, self.0)
    }
}

/// Accepts both `chat_7` and a bare `7`.
impl FromStr for SessionId {
    type Err = GpdiError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix(ID_PREFIX).unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| GpdiError::invalid_input(format!("'{}' is not a session id", s)))
    }
}

/// One exchange in a conversation.
///
/// Stored as a two-element array `[user_input, response]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Turn {
    pub user_input: String,
    pub response: String,
}

impl Turn {
    pub fn new(user_input: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            response: response.into(),
        }
    }
}

impl From<(String, String)> for Turn {
    fn from((user_input, response): (String, String)) -> Self {
        Self {
            user_input,
            response,
        }
    }
}

impl From<Turn> for (String, String) {
    fn from(turn: Turn) -> Self {
        (turn.user_input, turn.response)
    }
}
