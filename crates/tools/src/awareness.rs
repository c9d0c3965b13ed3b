//! Tool awareness registry: what the model is told it can do.
//!
//! Loaded from a JSON file of the form:
//!
//! ```json
//! {"tools": {"file_manager": {"description": "...", "commands": ["ls", "mkdir"]}}}
//! ```
//!
//! The registry only shapes the prompt. It grants nothing: execution is
//! still gated by the sanitizer's allowlist.

use promptsh_core::error::AwarenessError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One entry of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAwareness {
    pub description: String,

    #[serde(default)]
    pub commands: Vec<String>,
}

/// Read-only mapping of tool name → description and commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwarenessRegistry {
    #[serde(default)]
    tools: BTreeMap<String, ToolAwareness>,
}

impl AwarenessRegistry {
    pub fn new(tools: BTreeMap<String, ToolAwareness>) -> Self {
        Self { tools }
    }

    /// Registry used when no file is configured.
    pub fn builtin() -> Self {
        let mut tools = BTreeMap::new();
        tools.insert(
            "file_manager".to_string(),
            ToolAwareness {
                description: "Create, inspect, copy, move and delete files and directories".into(),
                commands: ["ls", "cd", "pwd", "mkdir", "touch", "rm", "cp", "mv", "cat", "echo"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
        );
        tools.insert(
            "system_control".to_string(),
            ToolAwareness {
                description: "Version control and package management".into(),
                commands: ["git", "npm", "pip"].into_iter().map(String::from).collect(),
            },
        );
        tools.insert(
            "web_search".to_string(),
            ToolAwareness {
                description: "Questions that need outside knowledge; answer them in plain text".into(),
                commands: Vec::new(),
            },
        );
        Self { tools }
    }

    /// Load from `path`, falling back to [`AwarenessRegistry::builtin`] when
    /// the file does not exist.
    pub fn load(path: &Path) -> Result<Self, AwarenessError> {
        if !path.exists() {
            tracing::debug!("No awareness file at {}, using built-in tools", path.display());
            return Ok(Self::builtin());
        }

        let content = std::fs::read_to_string(path).map_err(|e| AwarenessError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| AwarenessError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// One `"{tool}: {description}, Commands: {a, b}"` line per tool, in name order.
    pub fn prompt_lines(&self) -> String {
        self.tools
            .iter()
            .map(|(name, tool)| {
                format!(
                    "{}: {}, Commands: {}",
                    name,
                    tool.description,
                    tool.commands.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The tool whose command list contains `command`'s leading word.
    pub fn tool_for_command(&self, command: &str) -> Option<&str> {
        let leading = command.split_whitespace().next()?;
        self.tools
            .iter()
            .find(|(_, tool)| tool.commands.iter().any(|c| c == leading))
            .map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ToolAwareness> {
        self.tools.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolAwareness)> {
        self.tools.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Pretty JSON in the on-disk format (for `onboard`).
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lists_known_tools() {
        let registry = AwarenessRegistry::builtin();
        assert_eq!(registry.len(), 3);
        assert!(registry.get("file_manager").is_some());
        assert!(registry.get("system_control").is_some());
    }

    #[test]
    fn prompt_line_format() {
        let mut tools = BTreeMap::new();
        tools.insert(
            "file_manager".to_string(),
            ToolAwareness {
                description: "Manage files".into(),
                commands: vec!["ls".into(), "mkdir".into()],
            },
        );
        let registry = AwarenessRegistry::new(tools);
        assert_eq!(registry.prompt_lines(), "file_manager: Manage files, Commands: ls, mkdir");
    }

    #[test]
    fn prompt_lines_sorted_and_newline_joined() {
        let lines = AwarenessRegistry::builtin().prompt_lines();
        let names: Vec<&str> = lines.lines().map(|l| l.split(':').next().unwrap()).collect();
        assert_eq!(names, vec!["file_manager", "system_control", "web_search"]);
        assert!(lines.lines().last().unwrap().ends_with("Commands: "));
    }

    #[test]
    fn tool_for_command_uses_leading_word() {
        let registry = AwarenessRegistry::builtin();
        assert_eq!(registry.tool_for_command("git status"), Some("system_control"));
        assert_eq!(registry.tool_for_command("  mkdir -p a/b"), Some("file_manager"));
        assert_eq!(registry.tool_for_command("curl x"), None);
        assert_eq!(registry.tool_for_command(""), None);
    }

    #[test]
    fn load_missing_file_falls_back() {
        let registry = AwarenessRegistry::load(Path::new("/nonexistent/awareness.json")).unwrap();
        assert_eq!(registry, AwarenessRegistry::builtin());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("awareness.json");
        std::fs::write(
            &path,
            r#"{"tools": {"docker": {"description": "Containers", "commands": ["docker"]}}}"#,
        )
        .unwrap();

        let registry = AwarenessRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.prompt_lines(), "docker: Containers, Commands: docker");
    }

    #[test]
    fn load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("awareness.json");
        std::fs::write(&path, "{\"tools\": [").unwrap();

        let err = AwarenessRegistry::load(&path).unwrap_err();
        assert!(matches!(err, AwarenessError::ParseError { .. }));
    }

    #[test]
    fn commands_default_to_empty() {
        let registry: AwarenessRegistry =
            serde_json::from_str(r#"{"tools": {"notes": {"description": "Notes"}}}"#).unwrap();
        assert!(registry.get("notes").unwrap().commands.is_empty());
    }

    #[test]
    fn json_roundtrip() {
        let registry = AwarenessRegistry::builtin();
        let parsed: AwarenessRegistry = serde_json::from_str(&registry.to_json_pretty()).unwrap();
        assert_eq!(parsed, registry);
    }
}
