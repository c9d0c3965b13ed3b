//! Reply classification: command or prose, decided once.
//!
//! The model marks a reply it wants executed by starting it with a sentinel
//! character (`!`). Everything else is conversational text and is shown to
//! the user as-is.

use serde::{Deserialize, Serialize};

/// The sentinel that marks a reply as a command.
pub const DEFAULT_SENTINEL: char = '!';

/// A generator reply, tagged by intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Reply {
    /// Command text with the leading sentinel removed.
    Command(String),
    /// Conversational text, trimmed.
    Text(String),
}

impl Reply {
    /// Classify a raw reply.
    ///
    /// Exactly one sentinel is removed; whatever follows it (including a
    /// second sentinel) is kept for the sanitizer to judge.
    pub fn parse(raw: &str, sentinel: char) -> Self {
        let trimmed = raw.trim();
        match trimmed.strip_prefix(sentinel) {
            Some(rest) => Reply::Command(rest.trim_start().to_string()),
            None => Reply::Text(trimmed.to_string()),
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Reply::Command(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Reply::Command(t) | Reply::Text(t) => t,
        }
    }
}
