//! Reply sanitizer: raw model text in, ordered allowlisted commands out.
//!
//! Pipeline for a reply tagged as a command:
//!
//! 1. Split on the literal `&&` (no quote awareness: `"a && b"` splits too)
//! 2. Remove tool-name prefixes the model tends to echo (`file_manager`, ...)
//! 3. Trim segments, drop empty ones
//! 4. Pass `echo ... > ...` segments through verbatim
//! 5. Shell-word tokenize the rest; drop segments that fail to tokenize
//! 6. Keep segments whose first word is allowlisted
//!
//! Tokens are only used to inspect the leading word. The returned strings
//! are the original segment text so the shell sees the quoting and globs
//! the model wrote.
//!
//! Step 4 is the widest hole in the allowlist: anything containing both
//! `echo` and `>` runs unchecked, e.g. `echo hi > /dev/null; rm -rf ~`.

use promptsh_config::ShellConfig;
use promptsh_core::reply::{DEFAULT_SENTINEL, Reply};
use regex_lite::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::allowlist::{CommandAllowlist, CommandCheck};

/// Outcome for one `&&` segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SegmentVerdict {
    /// Leading word is allowlisted
    Accepted { text: String },
    /// `echo` with `>` redirection, accepted without inspection
    AcceptedRedirection { text: String },
    /// Leading word is not allowlisted
    Rejected {
        text: String,
        command: String,
        reason: String,
    },
    /// Shell-word tokenization failed (unbalanced quote, dangling escape)
    Unparseable { text: String, reason: String },
}

impl SegmentVerdict {
    pub fn text(&self) -> &str {
        match self {
            SegmentVerdict::Accepted { text }
            | SegmentVerdict::AcceptedRedirection { text }
            | SegmentVerdict::Rejected { text, .. }
            | SegmentVerdict::Unparseable { text, .. } => text,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            SegmentVerdict::Accepted { .. } | SegmentVerdict::AcceptedRedirection { .. }
        )
    }
}

/// Converts generator replies into executable command strings.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    allowlist: CommandAllowlist,
    sentinel: char,
    prefix_pattern: Option<Regex>,
}

impl Sanitizer {
    pub fn new(allowlist: CommandAllowlist, tool_prefixes: &[String], sentinel: char) -> Self {
        Self {
            allowlist,
            sentinel,
            prefix_pattern: prefix_pattern(tool_prefixes, sentinel),
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(
            CommandAllowlist::new(config.allowed_commands.iter().cloned()),
            &config.tool_prefixes,
            config.sentinel,
        )
    }

    pub fn allowlist(&self) -> &CommandAllowlist {
        &self.allowlist
    }

    pub fn sentinel(&self) -> char {
        self.sentinel
    }

    /// Classify and sanitize a raw reply.
    ///
    /// A reply that does not start with the sentinel yields no commands.
    pub fn sanitize(&self, raw: &str) -> Vec<String> {
        self.sanitize_reply(&Reply::parse(raw, self.sentinel))
    }

    /// Sanitize an already-classified reply.
    pub fn sanitize_reply(&self, reply: &Reply) -> Vec<String> {
        self.inspect_reply(reply)
            .into_iter()
            .filter(SegmentVerdict::is_accepted)
            .map(|v| v.text().to_string())
            .collect()
    }

    /// Per-segment verdicts for a raw reply, in segment order.
    pub fn inspect(&self, raw: &str) -> Vec<SegmentVerdict> {
        self.inspect_reply(&Reply::parse(raw, self.sentinel))
    }

    /// Per-segment verdicts for a classified reply. Prose has no segments.
    pub fn inspect_reply(&self, reply: &Reply) -> Vec<SegmentVerdict> {
        let Reply::Command(text) = reply else {
            return Vec::new();
        };

        let verdicts: Vec<SegmentVerdict> = text
            .split("&&")
            .map(|segment| self.strip_prefixes(segment))
            .filter_map(|segment| {
                let segment = segment.trim();
                if segment.is_empty() {
                    None
                } else {
                    self.judge(segment)
                }
            })
            .collect();

        debug!(
            segments = verdicts.len(),
            accepted = verdicts.iter().filter(|v| v.is_accepted()).count(),
            "Sanitized reply"
        );

        verdicts
    }

    fn judge(&self, segment: &str) -> Option<SegmentVerdict> {
        if segment.contains("echo") && segment.contains('>') {
            return Some(SegmentVerdict::AcceptedRedirection {
                text: segment.to_string(),
            });
        }

        let tokens = match shell_words::split(segment) {
            Ok(tokens) => tokens,
            Err(e) => {
                return Some(SegmentVerdict::Unparseable {
                    text: segment.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        match self.allowlist.check_tokens(&tokens) {
            CommandCheck::Allowed => Some(SegmentVerdict::Accepted {
                text: segment.to_string(),
            }),
            CommandCheck::Denied { command, reason } => Some(SegmentVerdict::Rejected {
                text: segment.to_string(),
                command,
                reason,
            }),
            CommandCheck::Empty => None,
        }
    }

    /// Remove standalone tool-name words (optionally `!name` or `name:`),
    /// collapsing the whitespace around each to one space.
    fn strip_prefixes(&self, text: &str) -> String {
        let Some(pattern) = &self.prefix_pattern else {
            return text.to_string();
        };

        // Adjacent prefixes share whitespace, so one pass can miss the second.
        let mut current = text.to_string();
        loop {
            let next = pattern.replace_all(&current, " ").into_owned();
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(
            CommandAllowlist::default(),
            &promptsh_config::default_tool_prefixes(),
            DEFAULT_SENTINEL,
        )
    }
}

fn prefix_pattern(tool_prefixes: &[String], sentinel: char) -> Option<Regex> {
    let alternatives: Vec<String> = tool_prefixes
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(regex_lite::escape)
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    let pattern = format!(
        r"(?:^|\s+){}?(?:{}):?(?:\s+|$)",
        regex_lite::escape(&sentinel.to_string()),
        alternatives.join("|")
    );

    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "Tool prefix pattern rejected; prefixes will not be stripped");
            None
        }
    }
}
