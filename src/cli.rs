//! CLI modes: apply a script, replay-diff a recorded log, or time a script.
//!
//! stdout carries only contractual output (event lines, bench stats);
//! diagnostics go to stderr through `tracing` or the error path, so a
//! recorded run can be diffed byte for byte.

use crate::codec;
use crate::engine::Engine;
use crate::errors::CliError;
use crate::script;
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "matchbook")]
#[command(
    version,
    about = "A deterministic limit order book matching engine",
    long_about = "Applies a totally ordered command stream to a \
                  price-time-priority book and emits a totally ordered \
                  event stream. Identical inputs produce byte-identical \
                  outputs across runs and platforms."
)]
pub struct Cli {
    /// Apply a command script and print event lines to stdout
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Tee emitted events to an append-only log file (with --script)
    #[arg(long, value_name = "PATH", requires = "script")]
    pub record: Option<PathBuf>,

    /// Re-run a script on a fresh engine and diff against a recorded log
    #[arg(long, value_name = "PATH", conflicts_with = "script")]
    pub replay: Option<PathBuf>,

    /// Recorded event log to diff against (with --replay)
    #[arg(long, value_name = "PATH", requires = "replay")]
    pub events: Option<PathBuf>,

    /// Apply a script repeatedly on fresh engines and print timings
    #[arg(long, value_name = "PATH", conflicts_with_all = ["script", "replay"])]
    pub bench: Option<PathBuf>,

    /// Iterations for --bench
    #[arg(long, value_name = "N")]
    pub iters: Option<u64>,

    /// Log engine activity to stderr at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Dispatches to exactly one mode. Mode selection errors are usage errors;
/// everything downstream carries its own exit code.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    match (&cli.script, &cli.replay, &cli.bench) {
        (Some(path), None, None) => run_script(path, cli.record.as_deref()),
        (None, Some(path), None) => {
            let events = cli.events.as_deref().ok_or_else(|| {
                CliError::Usage("--replay requires --events <PATH>".to_string())
            })?;
            run_replay(path, events)
        }
        (None, None, Some(path)) => run_bench(path, cli.iters),
        _ => Err(CliError::Usage(
            "exactly one of --script, --replay, --bench is required".to_string(),
        )),
    }
}

fn run_script(path: &Path, record: Option<&Path>) -> Result<(), CliError> {
    let cmds = script::load_script(path)?;

    let mut engine = Engine::new();
    if let Some(log_path) = record {
        engine.start_event_log(log_path)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for cmd in &cmds {
        for event in engine.apply(cmd)? {
            writeln!(out, "{}", codec::event_to_line(&event)).map_err(CliError::Io)?;
        }
    }
    out.flush().map_err(CliError::Io)?;
    engine.stop_event_log()?;

    let book = engine.book();
    info!(
        commands = cmds.len(),
        live = book.live_count(),
        best_bid = ?book.best_bid(),
        best_ask = ?book.best_ask(),
        "script applied"
    );
    Ok(())
}

fn run_replay(script_path: &Path, events_path: &Path) -> Result<(), CliError> {
    let cmds = script::load_script(script_path)?;

    let recorded = fs::read_to_string(events_path).map_err(CliError::EventsRead)?;
    let expected: Vec<&str> = recorded.lines().collect();
    // A recorded line that no longer parses is a broken events file, not a
    // divergence of the engine.
    for (i, line) in expected.iter().enumerate() {
        if codec::line_to_event(line).is_none() {
            return Err(CliError::EventsParse {
                line_no: i + 1,
                line: line.to_string(),
            });
        }
    }

    let mut engine = Engine::new();
    let mut actual = Vec::new();
    for cmd in &cmds {
        for event in engine.apply(cmd)? {
            actual.push(codec::event_to_line(&event));
        }
    }

    if expected.len() != actual.len() {
        return Err(CliError::ReplayLineCount {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    for (i, (want, got)) in expected.iter().zip(&actual).enumerate() {
        if want != got {
            print_diff_context(&expected, &actual, i);
            return Err(CliError::ReplayLineContent { line_no: i + 1 });
        }
    }

    info!(lines = actual.len(), "replay matched");
    Ok(())
}

/// Shows the first differing line with one line of context on each side.
fn print_diff_context(expected: &[&str], actual: &[String], at: usize) {
    let lo = at.saturating_sub(1);
    let hi = (at + 1).min(expected.len() - 1);
    for i in lo..=hi {
        let marker = if i == at { '>' } else { ' ' };
        eprintln!("{marker} line {}: expected `{}`", i + 1, expected[i]);
        eprintln!("{marker} line {}: actual   `{}`", i + 1, actual[i]);
    }
}

fn run_bench(path: &Path, iters: Option<u64>) -> Result<(), CliError> {
    let iters = match iters {
        Some(n) if n > 0 => n,
        Some(_) => return Err(CliError::BenchArgs("--iters must be > 0".to_string())),
        None => return Err(CliError::BenchArgs("--bench requires --iters <N>".to_string())),
    };
    let cmds = script::load_script(path)?;

    let mut total_events: u64 = 0;
    let started = Instant::now();
    for _ in 0..iters {
        let mut engine = Engine::new();
        for cmd in &cmds {
            total_events += engine.apply(cmd)?.len() as u64;
        }
    }
    let total_ns = started.elapsed().as_nanos();

    let per_iter_ns = total_ns / u128::from(iters);
    let per_event_ns = if total_events == 0 {
        0
    } else {
        total_ns / u128::from(total_events)
    };
    println!("total_ns={total_ns} per_iter_ns={per_iter_ns} per_event_ns={per_event_ns}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScriptError;

    fn write_script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("script.txt");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn replay_matches_its_own_recording() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            &dir,
            "add 1 sell 100 10\nadd 2 buy 150 4\ncancel 1\ncancel 1\n",
        );
        let log = dir.path().join("events.log");

        run_script(&script, Some(&log)).unwrap();
        run_replay(&script, &log).unwrap();
    }

    #[test]
    fn replay_detects_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "add 1 sell 100 10\n");
        let log = dir.path().join("events.log");
        run_script(&script, Some(&log)).unwrap();

        // replaying a longer script against the short recording
        let longer = write_script(&dir, "add 1 sell 100 10\nadd 2 buy 90 1\n");
        match run_replay(&longer, &log) {
            Err(CliError::ReplayLineCount { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 4);
            }
            other => panic!("expected count mismatch, got {other:?}"),
        }
    }

    #[test]
    fn replay_detects_content_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "add 1 sell 100 10\nadd 2 buy 90 1\n");
        let log = dir.path().join("events.log");
        run_script(&script, Some(&log)).unwrap();

        // doctor one field in the recording; line count stays equal
        let recorded = fs::read_to_string(&log).unwrap();
        let doctored = recorded.replacen("qty=10", "qty=11", 1);
        assert_ne!(recorded, doctored);
        fs::write(&log, doctored).unwrap();

        match run_replay(&script, &log) {
            Err(CliError::ReplayLineContent { line_no }) => assert_eq!(line_no, 1),
            other => panic!("expected content mismatch, got {other:?}"),
        }
    }

    #[test]
    fn replay_rejects_corrupt_events_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "add 1 sell 100 10\n");
        let log = dir.path().join("events.log");
        fs::write(&log, "this is not an event line\n").unwrap();

        match run_replay(&script, &log) {
            Err(CliError::EventsParse { line_no, .. }) => assert_eq!(line_no, 1),
            other => panic!("expected events parse failure, got {other:?}"),
        }
    }

    #[test]
    fn script_mode_propagates_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "add 1 sell 100 10\nnope\n");

        match run_script(&script, None) {
            Err(CliError::ScriptLoad(ScriptError::Parse { line_no, .. })) => {
                assert_eq!(line_no, 2);
            }
            other => panic!("expected script load failure, got {other:?}"),
        }
    }

    #[test]
    fn bench_requires_positive_iters() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "add 1 sell 100 10\n");

        assert!(matches!(
            run_bench(&script, None),
            Err(CliError::BenchArgs(_))
        ));
        assert!(matches!(
            run_bench(&script, Some(0)),
            Err(CliError::BenchArgs(_))
        ));
        run_bench(&script, Some(2)).unwrap();
    }
}
