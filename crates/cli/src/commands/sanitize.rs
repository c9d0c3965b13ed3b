//! `promptsh sanitize`: per-segment verdicts without executing anything.

use super::load_config;
use promptsh_security::{Sanitizer, SegmentVerdict};

pub fn run(reply: String, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let sanitizer = Sanitizer::from_config(&config.shell);
    let verdicts = sanitizer.inspect(&reply);

    if json {
        println!("{}", serde_json::to_string_pretty(&verdicts)?);
        return Ok(());
    }

    if verdicts.is_empty() {
        println!("  (no command segments)");
    }
    for verdict in &verdicts {
        println!("  {}", describe(verdict));
    }

    let kept = verdicts.iter().filter(|v| v.is_accepted()).count();
    println!();
    println!("  {kept} of {} segment(s) would run", verdicts.len());
    Ok(())
}

fn describe(verdict: &SegmentVerdict) -> String {
    match verdict {
        SegmentVerdict::Accepted { text } => format!("✅ {text}"),
        SegmentVerdict::AcceptedRedirection { text } => {
            format!("⚠️  {text}  (echo redirection, not inspected)")
        }
        SegmentVerdict::Rejected { text, reason, .. } => format!("❌ {text}  ({reason})"),
        SegmentVerdict::Unparseable { text, reason } => format!("❌ {text}  ({reason})"),
    }
}
