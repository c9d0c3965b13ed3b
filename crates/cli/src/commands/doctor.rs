//! `promptsh doctor`: diagnose configuration and Ollama connectivity.

use promptsh_config::AppConfig;
use promptsh_tools::AwarenessRegistry;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 promptsh doctor");
    println!("==================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    let config = match AppConfig::load() {
        Ok(config) => {
            if config_path.exists() {
                println!("  ✅ Config file valid: {}", config_path.display());
            } else {
                println!("  ⚠️  No config file, using defaults — run `promptsh onboard`");
            }
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  Fix the config file and re-run doctor.");
            return Ok(());
        }
    };

    let awareness_path = config.awareness_path();
    match AwarenessRegistry::load(&awareness_path) {
        Ok(registry) if awareness_path.exists() => {
            println!("  ✅ Awareness file valid ({} tools)", registry.len());
        }
        Ok(registry) => {
            println!("  ⚠️  No awareness file, using {} built-in tools", registry.len());
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    let provider = promptsh_providers::build_from_config(&config);
    match provider.health_check().await {
        Ok(true) => {
            println!("  ✅ Ollama reachable at {}", config.ollama.base_url);

            match provider.list_models().await {
                Ok(models) if has_model(&models, &config.model) => {
                    println!("  ✅ Model '{}' is available", config.model);
                }
                Ok(_) => {
                    println!(
                        "  ❌ Model '{}' not found — run `ollama pull {}`",
                        config.model, config.model
                    );
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Could not list models: {e}");
                    issues += 1;
                }
            }
        }
        Ok(false) | Err(_) => {
            println!("  ❌ Ollama not reachable at {} — is `ollama serve` running?", config.ollama.base_url);
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Ollama reports untagged models as `<name>:latest`.
fn has_model(models: &[String], wanted: &str) -> bool {
    models.iter().any(|m| {
        m == wanted || (!wanted.contains(':') && m.strip_suffix(":latest") == Some(wanted))
    })
}
