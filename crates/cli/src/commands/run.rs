//! `promptsh run`: a single turn.

use super::{build_agent, load_config};
use promptsh_tools::ShellSession;

pub async fn run(
    prompt: String,
    model: Option<String>,
    no_stream: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let agent = build_agent(&config, model, no_stream);
    let mut session = ShellSession::from_current_dir()?;

    super::shell::turn(&agent, &mut session, &prompt).await?;
    Ok(())
}
