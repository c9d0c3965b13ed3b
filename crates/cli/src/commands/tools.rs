//! `promptsh tools`: what the model is told, and what may actually run.

use super::load_config;
use promptsh_security::{CommandAllowlist, Sanitizer};
use promptsh_tools::AwarenessRegistry;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let path = config.awareness_path();
    let registry = AwarenessRegistry::load(&path)?;

    let source = if path.exists() {
        path.display().to_string()
    } else {
        "built-in".to_string()
    };
    println!("Tools ({source}):");
    for (name, tool) in registry.iter() {
        println!("  {name:<16} {}", tool.description);
        if !tool.commands.is_empty() {
            println!("  {:<16} commands: {}", "", tool.commands.join(", "));
        }
    }

    let sanitizer = Sanitizer::from_config(&config.shell);
    println!();
    println!("Allowed commands:");
    for row in allowlist_rows(&registry, sanitizer.allowlist()) {
        println!("  {row}");
    }
    println!();
    println!("Sentinel: {}", sanitizer.sentinel());
    Ok(())
}

/// One line per allowed command, naming the tool that advertises it.
fn allowlist_rows(registry: &AwarenessRegistry, allowlist: &CommandAllowlist) -> Vec<String> {
    allowlist
        .iter()
        .map(|command| match registry.tool_for_command(command) {
            Some(tool) => format!("{command:<8} ({tool})"),
            None => format!("{command:<8} (not described to the model)"),
        })
        .collect()
}
