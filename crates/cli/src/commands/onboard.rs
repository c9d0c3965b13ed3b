//! `promptsh onboard`: first-time setup.

use promptsh_config::AppConfig;
use promptsh_tools::AwarenessRegistry;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🐚 promptsh — First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let config = AppConfig::load_from(&config_path)?;
    let awareness_path = config.awareness_path();
    if awareness_path.exists() {
        println!("⚠️  Awareness file already exists at: {}", awareness_path.display());
    } else {
        if let Some(parent) = awareness_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&awareness_path, AwarenessRegistry::builtin().to_json_pretty())?;
        println!("✅ Created awareness.json at: {}", awareness_path.display());
    }

    println!("\n📝 Next steps:");
    println!("   1. Install Ollama and run: ollama pull {}", config.model);
    println!("   2. Check the setup:        promptsh doctor");
    println!("   3. Start the shell:        promptsh shell\n");

    Ok(())
}
