//! Command script parsing.
//!
//! One command per line:
//!
//! ```text
//! add <id> <buy|sell|b|s> <price_ticks> <qty>
//! cancel <id>
//! ```
//!
//! `#` starts a comment that runs to the end of the line. Blank and
//! comment-only lines are skipped. Keyword and side tokens are
//! case-insensitive; extra tokens after the expected fields fail the parse.

use crate::command::Command;
use crate::errors::ScriptError;
use crate::orders::Side;
use std::fs;
use std::path::Path;

/// Drops a trailing comment and surrounding whitespace. CRLF line endings
/// are already handled by the line splitter.
fn significant(line: &str) -> &str {
    let line = match line.split_once('#') {
        Some((head, _)) => head,
        None => line,
    };
    line.trim()
}

/// Parses one significant (non-blank, non-comment) line. Returns `None` on
/// any malformed input; the caller attaches the line number.
pub fn parse_line(line: &str) -> Option<Command> {
    let mut tokens = line.split_whitespace();

    let keyword = tokens.next()?.to_ascii_lowercase();
    let cmd = match keyword.as_str() {
        "add" => {
            let id = tokens.next()?.parse().ok()?;
            let side = match tokens.next()?.to_ascii_lowercase().as_str() {
                "buy" | "b" => Side::Buy,
                "sell" | "s" => Side::Sell,
                _ => return None,
            };
            let price_ticks = tokens.next()?.parse().ok()?;
            let qty = tokens.next()?.parse().ok()?;
            Command::add_limit(id, side, price_ticks, qty)
        }
        "cancel" => {
            let id = tokens.next()?.parse().ok()?;
            Command::cancel(id)
        }
        _ => return None,
    };

    if tokens.next().is_some() {
        return None;
    }
    Some(cmd)
}

/// Loads a whole script file, skipping blank and comment lines.
pub fn load_script(path: &Path) -> Result<Vec<Command>, ScriptError> {
    let text = fs::read_to_string(path)?;

    let mut out = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = significant(raw);
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(cmd) => out.push(cmd),
            None => {
                return Err(ScriptError::Parse {
                    line_no: i + 1,
                    line: raw.to_string(),
                });
            }
        }
    }
    Ok(out)
}
