use std::fmt::Write;

use anyhow::Result;
use rtok_core::{CountReport, format_thousands, format_tokens};

use crate::cli::OutputMode;

/// ANSI styles, all empty when color is off
struct Palette {
    reset: &'static str,
    bold: &'static str,
    cyan: &'static str,
    green: &'static str,
    magenta: &'static str,
    yellow: &'static str,
    blue: &'static str,
}

impl Palette {
    fn new(color: bool) -> Self {
        if color {
            Self {
                reset: "\x1b[0m",
                bold: "\x1b[1m",
                cyan: "\x1b[36m",
                green: "\x1b[32m",
                magenta: "\x1b[35m",
                yellow: "\x1b[33m",
                blue: "\x1b[34m",
            }
        } else {
            Self {
                reset: "",
                bold: "",
                cyan: "",
                green: "",
                magenta: "",
                yellow: "",
                blue: "",
            }
        }
    }
}

/// Render `report` for printing; the result has no trailing newline
pub fn render(report: &CountReport, target_name: &str, mode: OutputMode, color: bool) -> Result<String> {
    let compact = format_tokens(report.total_tokens);

    let out = match mode {
        OutputMode::Simple => compact,
        OutputMode::StatusLine => format!("📊 {compact} tokens"),
        OutputMode::Json => serde_json::to_string_pretty(report)?,
        OutputMode::Full => format!(
            "Target: {}\nFiles: {}\nTokens: {} ({})",
            target_name,
            format_thousands(report.file_count),
            format_thousands(report.total_tokens),
            compact
        ),
        OutputMode::Pretty => pretty(report, target_name, &Palette::new(color))?,
    };

    Ok(out)
}

fn pretty(report: &CountReport, target_name: &str, p: &Palette) -> Result<String> {
    const RULE: &str = "───────────────────────────────────────────────────────";

    let skipped = report.skipped.nonzero();
    let skipped = if skipped.is_empty() {
        "0".to_string()
    } else {
        skipped
            .iter()
            .map(|(reason, n)| format!("{n} {reason}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut out = String::new();
    writeln!(out, "{}┌{RULE}┐{}", p.cyan, p.reset)?;
    writeln!(
        out,
        "{}│{} {}Repo Tokens Summary{}",
        p.cyan, p.reset, p.bold, p.reset
    )?;
    writeln!(out, "{}├{RULE}┤{}", p.cyan, p.reset)?;
    writeln!(out, "{}│{} 📁 {}{}{}", p.cyan, p.reset, p.bold, target_name, p.reset)?;
    writeln!(
        out,
        "{}│{} 🧠 Model: {}{}{}  {}[{}]{}",
        p.cyan, p.reset, p.magenta, report.model, p.reset, p.blue, report.encoding, p.reset
    )?;
    writeln!(
        out,
        "{}│{} 🗂️  Files counted: {}{}{}  •  Skipped: {}{}{}",
        p.cyan,
        p.reset,
        p.green,
        format_thousands(report.file_count),
        p.reset,
        p.yellow,
        skipped,
        p.reset
    )?;
    writeln!(
        out,
        "{}│{} 🔢 Tokens: {}{}{}  ({}{}{})  •  Avg/file: {}",
        p.cyan,
        p.reset,
        p.bold,
        format_thousands(report.total_tokens),
        p.reset,
        p.green,
        format_tokens(report.total_tokens),
        p.reset,
        format_thousands(report.average_per_file())
    )?;

    let top = report.top_extensions(3);
    if !top.is_empty() {
        let top = top
            .iter()
            .map(|(ext, tokens)| format!("{ext}: {}", format_tokens(*tokens)))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "{}│{} 🔎 Top types: {}", p.cyan, p.reset, top)?;
    }

    let cache = if report.cached { "hit" } else { "miss" };
    writeln!(out, "{}├{RULE}┤{}", p.cyan, p.reset)?;
    writeln!(out, "{}│{} cache={}", p.cyan, p.reset, cache)?;
    write!(out, "{}└{RULE}┘{}", p.cyan, p.reset)?;

    Ok(out)
}
