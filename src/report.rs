// src/report.rs
// =============================================================================
// Prints one line per probed link as soon as its result arrives.
//
// Two formats:
// - Text:  "✓: (200) https://site/page -> https://linked/"
//          "❌: (unreachable) https://site/page -> https://gone/"
// - JSON:  one serialized LinkCheckResult per line
//
// Every line is flushed immediately so progress is visible on long runs.
// Fatal diagnostics for stderr are built by `error_chain`.
// =============================================================================

use std::error::Error;
use std::io::{self, Write};

use crate::checker::{LinkCheckResult, ProbeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    lines: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            lines: 0,
        }
    }

    pub fn report(&mut self, result: &LinkCheckResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", format_line(result))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, result)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        self.lines += 1;
        Ok(())
    }

    /// Number of result lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Formats a result as a single human-readable line (without newline).
pub fn format_line(result: &LinkCheckResult) -> String {
    let glyph = if result.is_ok() { "✓" } else { "❌" };
    let status = match result.status {
        ProbeStatus::Code(code) => code.to_string(),
        ProbeStatus::Unreachable(_) => "unreachable".to_string(),
    };
    format!("{}: ({}) {} -> {}", glyph, status, result.origin, result.url)
}

/// Joins an error and its causes with ": ".
///
/// reqwest and hyper already put their cause into their own message, so a
/// cause whose text is already present is skipped.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
