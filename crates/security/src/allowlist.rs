//! Command allowlist: which leading words may be handed to the shell.
//!
//! The list is fixed when the process starts. Matching is exact and
//! case-sensitive on the first shell word of a segment.

use std::collections::BTreeSet;

/// Result of checking a tokenized command against the allowlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandCheck {
    /// Leading word is allowed
    Allowed,
    /// Leading word is not on the list
    Denied { command: String, reason: String },
    /// Nothing to check
    Empty,
}

/// Immutable set of permitted leading command names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAllowlist {
    commands: BTreeSet<String>,
}

impl CommandAllowlist {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `word` is a permitted leading command.
    pub fn contains(&self, word: &str) -> bool {
        self.commands.contains(word)
    }

    /// Check an already-tokenized command by its first token.
    ///
    /// Rules:
    /// - No tokens → `Empty`
    /// - First token on the list → `Allowed`
    /// - Anything else → `Denied`
    pub fn check_tokens(&self, tokens: &[String]) -> CommandCheck {
        let Some(first) = tokens.first() else {
            return CommandCheck::Empty;
        };

        if self.contains(first) {
            CommandCheck::Allowed
        } else {
            CommandCheck::Denied {
                command: first.clone(),
                reason: format!(
                    "Command '{}' not in allowlist ({} commands configured)",
                    first,
                    self.commands.len()
                ),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandAllowlist {
    fn default() -> Self {
        Self::new(promptsh_config::default_allowed_commands())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn default_list_matches_shipped_commands() {
        let list = CommandAllowlist::default();
        for cmd in ["ls", "cd", "pwd", "mkdir", "touch", "rm", "cp", "mv", "cat", "echo", "git", "npm", "pip"] {
            assert!(list.contains(cmd), "{cmd} should be allowed");
        }
        assert_eq!(list.len(), 13);
    }

    #[test]
    fn allowed_leading_word() {
        let list = CommandAllowlist::new(["ls", "git"]);
        assert_eq!(list.check_tokens(&tokens(&["git", "status"])), CommandCheck::Allowed);
    }

    #[test]
    fn denied_leading_word() {
        let list = CommandAllowlist::default();
        match list.check_tokens(&tokens(&["sudo", "rm", "-rf", "/"])) {
            CommandCheck::Denied { command, reason } => {
                assert_eq!(command, "sudo");
                assert!(reason.contains("not in allowlist"));
            }
            other => panic!("Expected denied, got {other:?}"),
        }
    }

    #[test]
    fn only_first_token_matters() {
        let list = CommandAllowlist::new(["echo"]);
        assert_eq!(list.check_tokens(&tokens(&["echo", "sudo"])), CommandCheck::Allowed);
        assert!(matches!(
            list.check_tokens(&tokens(&["sudo", "echo"])),
            CommandCheck::Denied { .. }
        ));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let list = CommandAllowlist::new(["ls"]);
        assert!(!list.contains("LS"));
        assert!(!list.contains("/bin/ls"));
    }

    #[test]
    fn empty_tokens() {
        let list = CommandAllowlist::default();
        assert_eq!(list.check_tokens(&[]), CommandCheck::Empty);
    }

    #[test]
    fn iteration_is_sorted() {
        let list = CommandAllowlist::new(["mv", "cat", "ls"]);
        let all: Vec<&str> = list.iter().collect();
        assert_eq!(all, vec!["cat", "ls", "mv"]);
        assert!(!list.is_empty());
    }
}
