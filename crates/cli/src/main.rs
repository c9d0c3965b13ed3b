//! promptsh CLI: the main entry point.
//!
//! Commands:
//! - `shell`   : Interactive natural-language shell
//! - `run`     : One prompt, one turn
//! - `exec`    : Sanitize and execute a raw model reply
//! - `sanitize`: Show what the sanitizer would keep
//! - `tools`   : Show the tool awareness registry and allowlist
//! - `doctor`  : Diagnose config and Ollama connectivity
//! - `onboard` : Write default config and awareness files

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "promptsh",
    about = "promptsh — talk to your shell through a local LLM",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell
    Shell {
        /// Override the configured model
        #[arg(short, long)]
        model: Option<String>,

        /// Wait for the whole reply instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },

    /// Run a single prompt
    Run {
        /// What to do, in plain language
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,

        #[arg(short, long)]
        model: Option<String>,

        #[arg(long)]
        no_stream: bool,
    },

    /// Sanitize and execute a reply without calling the model (e.g. "!ls && pwd")
    Exec { reply: String },

    /// Dry-run the sanitizer on a reply
    Sanitize {
        reply: String,

        /// Print verdicts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the tool awareness registry and the command allowlist
    Tools,

    /// Diagnose configuration and Ollama connectivity
    Doctor,

    /// Write default configuration and awareness files
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with command output
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Shell { model, no_stream } => commands::shell::run(model, no_stream).await?,
        Commands::Run {
            prompt,
            model,
            no_stream,
        } => commands::run::run(prompt.join(" "), model, no_stream).await?,
        Commands::Exec { reply } => commands::exec::run(reply).await?,
        Commands::Sanitize { reply, json } => commands::sanitize::run(reply, json)?,
        Commands::Tools => commands::tools::run()?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Onboard => commands::onboard::run()?,
    }

    Ok(())
}
