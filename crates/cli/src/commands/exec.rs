//! `promptsh exec`: run a reply as if the model had produced it.

use super::{build_agent, load_config};
use promptsh_tools::ShellSession;

pub async fn run(reply: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let agent = build_agent(&config, None, false);
    let mut session = ShellSession::from_current_dir()?;

    let outcome = agent.execute_reply(&mut session, &reply).await;
    println!("{outcome}");
    Ok(())
}
