//! `promptsh shell`: the interactive loop.

use super::{build_agent, load_config, print_fragment};
use promptsh_agent::{ShellAgent, TurnOutcome};
use promptsh_core::Error;
use promptsh_tools::ShellSession;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

pub async fn run(model: Option<String>, no_stream: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let agent = build_agent(&config, model, no_stream);
    let mut session = ShellSession::from_current_dir()?;

    println!();
    println!("  promptsh — natural-language shell");
    println!("  Model:     {}", agent.model());
    println!("  Directory: {}", session.current_dir().display());
    println!("  Type 'exit' or 'quit' to leave.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!(">> ");
        std::io::stdout().flush()?;

        let Some(line) = next_input(&mut lines).await? else {
            println!();
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if is_exit(input) {
            break;
        }

        if let Err(e) = turn(&agent, &mut session, input).await {
            eprintln!("Error: {e}");
        }
    }

    Ok(())
}

/// Next input line, or `None` at end of input. A line that is not valid
/// UTF-8 is reported and skipped; other read errors end the session.
async fn next_input<R>(lines: &mut Lines<R>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match lines.next_line().await {
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                eprintln!("Error: {e}");
                print!(">> ");
                std::io::stdout().flush()?;
            }
            other => return other,
        }
    }
}

/// Run one turn, echoing the reply as it streams and then the report.
pub(crate) async fn turn(
    agent: &ShellAgent,
    session: &mut ShellSession,
    input: &str,
) -> Result<(), Error> {
    print!("AI: ");
    std::io::stdout().flush()?;
    let outcome = agent.handle_turn(session, input, print_fragment).await;
    println!();

    if let TurnOutcome::Executed { report, .. } = outcome? {
        println!("{report}");
    }
    Ok(())
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
