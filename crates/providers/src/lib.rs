//! LLM Provider implementations for promptsh.
//!
//! All providers implement the `promptsh_core::Provider` trait.

pub mod ollama;

pub use ollama::OllamaProvider;

use std::sync::Arc;
use promptsh_core::Provider;

/// Build the configured provider.
pub fn build_from_config(config: &promptsh_config::AppConfig) -> Arc<dyn Provider> {
    Arc::new(
        OllamaProvider::new(&config.ollama.base_url)
            .with_timeout(std::time::Duration::from_secs(config.ollama.timeout_secs))
            .with_temperature(config.ollama.temperature),
    )
}
