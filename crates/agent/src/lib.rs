//! The promptsh turn pipeline.
//!
//! One turn:
//!
//! 1. **Build the prompt** from the tool awareness registry
//! 2. **Generate** a reply through the configured provider, streaming
//!    fragments to the caller as they arrive
//! 3. **Classify** the reply: prose is returned as-is, a `!` reply is a
//!    command request
//! 4. **Sanitize** the command text against the allowlist
//! 5. **Execute** the surviving commands in order against the session

pub mod prompt;
pub mod shell_agent;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use prompt::SystemPrompt;
pub use shell_agent::{ShellAgent, TurnOutcome};
pub use stream::{collect_reply, fragments};
