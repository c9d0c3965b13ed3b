//! Subcommand implementations.

pub mod doctor;
pub mod exec;
pub mod onboard;
pub mod run;
pub mod sanitize;
pub mod shell;
pub mod tools;

use promptsh_agent::ShellAgent;
use promptsh_config::AppConfig;
use std::io::Write;

pub(crate) fn load_config() -> promptsh_core::Result<AppConfig> {
    Ok(AppConfig::load()?)
}

/// Agent for `config`, with CLI overrides applied.
pub(crate) fn build_agent(config: &AppConfig, model: Option<String>, no_stream: bool) -> ShellAgent {
    let provider = promptsh_providers::build_from_config(config);
    let mut agent = ShellAgent::from_config(provider, config);
    if let Some(model) = model {
        agent = agent.with_model(model);
    }
    if no_stream {
        agent = agent.with_streaming(false);
    }
    agent
}

/// Echo a reply fragment as soon as it arrives.
pub(crate) fn print_fragment(fragment: &str) {
    print!("{fragment}");
    let _ = std::io::stdout().flush();
}
