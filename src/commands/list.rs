//! List letters

use anyhow::Result;
use std::io::Write;

use crate::content::LetterSummary;
use crate::Letterbox;

/// Print every letter, newest first
pub fn run(app: &Letterbox, json: bool) -> Result<()> {
    let summaries = app.controller().summaries()?;
    let stdout = std::io::stdout();
    write_listing(&mut stdout.lock(), &summaries, json)
}

fn write_listing<W: Write>(out: &mut W, summaries: &[LetterSummary], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, summaries)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Letters ({}):", summaries.len())?;
    for letter in summaries {
        writeln!(
            out,
            "  {} - {} [{}]",
            letter.publish_date.format("%Y-%m-%d"),
            letter.subject,
            letter.slug
        )?;
    }
    Ok(())
}
