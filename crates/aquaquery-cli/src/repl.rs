//! Subcommand: `aquaquery repl` -- interactive question loop.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use aquaquery_engine::QueryEngine;
use tracing::info;

use crate::helpers::format_result;

/// Run the REPL on stdin/stdout.
pub fn cmd_repl(engine: &QueryEngine, session: &str) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(engine, session, stdin.lock(), stdout.lock())
}

/// Read questions from `input` until EOF or `quit`/`exit`, writing answers
/// to `output`.
pub fn run<R: BufRead, W: Write>(
    engine: &QueryEngine,
    session: &str,
    input: R,
    mut output: W,
) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "  AquaQuery v{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(output, "  Ask about groundwater, or type 'quit' to exit.")?;
    writeln!(output)?;
    prompt(&mut output)?;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            prompt(&mut output)?;
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            info!(session, "user requested exit");
            break;
        }

        let result = engine.process_query(trimmed, Some(session));
        writeln!(output, "\n{}\n", format_result(&result))?;
        prompt(&mut output)?;
    }

    let turns = engine
        .sessions()
        .snapshot(session)
        .map(|s| s.query_count)
        .unwrap_or(0);
    writeln!(output, "\nGoodbye! ({turns} questions answered)")?;
    output.flush()?;
    Ok(())
}

fn prompt<W: Write>(output: &mut W) -> Result<()> {
    write!(output, "> ")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn answers_until_quit() {
        let engine = QueryEngine::builder().build().unwrap();
        let input = Cursor::new("Hello\n\nWhich areas are critical?\nquit\nHello\n");
        let mut output = Vec::new();

        run(&engine, "t", input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("Namaste!"));
        assert!(text.contains("[intent: critical_areas"));
        assert!(text.contains("(2 questions answered)"));
        assert_eq!(engine.sessions().snapshot("t").unwrap().query_count, 2);
    }

    #[test]
    fn eof_ends_the_loop() {
        let engine = QueryEngine::builder().build().unwrap();
        let mut output = Vec::new();
        run(&engine, "t", Cursor::new(""), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("(0 questions answered)"));
    }
}
