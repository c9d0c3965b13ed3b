//! System prompt assembly.

use promptsh_core::DEFAULT_SENTINEL;
use promptsh_tools::AwarenessRegistry;

/// Builds the instruction block sent ahead of every user prompt.
pub struct SystemPrompt;

impl SystemPrompt {
    /// Prompt for the default `!` sentinel.
    pub fn build(registry: &AwarenessRegistry) -> String {
        Self::build_with_sentinel(registry, DEFAULT_SENTINEL)
    }

    pub fn build_with_sentinel(registry: &AwarenessRegistry, sentinel: char) -> String {
        let tools = registry.prompt_lines();
        let s = sentinel;

        format!(
            "You are a shell assistant that turns requests into commands for the user's machine.\n\
             You have access to the following tools:\n\n\
             {tools}\n\n\
             ### RULES ###\n\
             1. If the request matches a tool command, respond ONLY with the exact shell command, prefixed by `{s}`.\n   \
                - 'list files' -> `{s}ls`\n   \
                - 'create a directory called test' -> `{s}mkdir test`\n\n\
             2. If the request needs several steps, join them with `&&` into one single-line command.\n   \
                - 'create mydir with hello.txt inside' -> `{s}mkdir mydir && touch mydir/hello.txt`\n\n\
             3. Do NOT return bracketed tool references such as `[file_manager: ls]`, and do not explain the command.\n   \
                - WRONG: `[file_manager: ls]`\n   \
                - CORRECT: `{s}ls`\n\n\
             4. If the request cannot be fulfilled with a shell command, answer in plain text without the `{s}` prefix.\n\n\
             Always prefer returning the correct command."
        )
    }
}
