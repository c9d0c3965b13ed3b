//! Tool awareness and command execution for promptsh.
//!
//! - [`awareness`]: the read-only tool → {description, commands} registry
//!   that is described to the model in the system prompt
//! - [`executor`]: runs sanitized commands one by one against a
//!   [`ShellSession`] whose working directory survives `cd`

pub mod awareness;
pub mod executor;

pub use awareness::{AwarenessRegistry, ToolAwareness};
pub use executor::{
    ExecutionReport, ExecutionResult, Executor, NO_VALID_COMMANDS, ShellSession, StepOutcome,
};
