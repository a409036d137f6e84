//! Thin command dispatcher over [`OrderBook`] with an optional append-only
//! event log.

use crate::codec;
use crate::command::Command;
use crate::errors::EngineError;
use crate::event::Event;
use crate::orderbook::OrderBook;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Owns exactly one book and at most one log sink, both tied to the
/// engine's lifetime. Applying the same command stream to two fresh engines
/// yields byte-identical event lines.
pub struct Engine {
    book: OrderBook,
    log: Option<BufWriter<File>>,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            book: OrderBook::new(),
            log: None,
        }
    }

    /// Truncates or creates the log file and starts teeing events to it.
    pub fn start_event_log(&mut self, path: &Path) -> Result<(), EngineError> {
        let file = File::create(path)?;
        self.log = Some(BufWriter::new(file));
        info!(path = %path.display(), "event log started");
        Ok(())
    }

    /// Flushes and closes the log sink. A no-op when logging is off.
    pub fn stop_event_log(&mut self) -> Result<(), EngineError> {
        if let Some(mut log) = self.log.take() {
            log.flush()?;
        }
        Ok(())
    }

    /// Applies one command and returns its ordered event batch. When
    /// logging is enabled, the batch is appended line by line and flushed
    /// before returning.
    pub fn apply(&mut self, cmd: &Command) -> Result<Vec<Event>, EngineError> {
        let events = match *cmd {
            Command::AddLimit {
                id,
                side,
                price_ticks,
                qty,
            } => self.book.add_limit(id, side, price_ticks, qty),
            Command::Cancel { id } => self.book.cancel(id),
        };

        if let Some(log) = self.log.as_mut() {
            for event in &events {
                log.write_all(codec::event_to_line(event).as_bytes())?;
                log.write_all(b"\n")?;
            }
            log.flush()?;
        }
        Ok(events)
    }

    /// Applies commands in list order, concatenating the event batches.
    /// This is the canonical determinism harness.
    pub fn apply_all(&mut self, cmds: &[Command]) -> Result<Vec<Event>, EngineError> {
        let mut out = Vec::new();
        for cmd in cmds {
            out.extend(self.apply(cmd)?);
        }
        Ok(out)
    }

    /// Read-only access to the book for queries.
    pub fn book(&self) -> &OrderBook {
        &self.book
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use crate::orders::Side;
    use std::fs;

    fn to_lines(events: &[Event]) -> Vec<String> {
        events.iter().map(codec::event_to_line).collect()
    }

    #[test]
    fn apply_dispatches_by_command_variant() {
        let mut engine = Engine::new();

        let add = engine
            .apply(&Command::add_limit(1, Side::Buy, 100, 5))
            .unwrap();
        assert_eq!(add[0].event_type, EventType::OrderAccepted);
        assert!(engine.book().has(1));

        let cancel = engine.apply(&Command::cancel(1)).unwrap();
        assert_eq!(cancel[0].event_type, EventType::OrderCancelled);
        assert!(!engine.book().has(1));
    }

    /// Same script applied to two fresh engines produces identical lines.
    #[test]
    fn same_commands_same_events() {
        let cmds = vec![
            Command::add_limit(1, Side::Sell, 100, 5),
            Command::add_limit(2, Side::Sell, 100, 5),
            Command::add_limit(3, Side::Buy, 100, 6),
            Command::cancel(2),
            Command::add_limit(4, Side::Buy, 100, 10),
        ];

        let mut a = Engine::new();
        let mut b = Engine::new();

        let ea = a.apply_all(&cmds).unwrap();
        let eb = b.apply_all(&cmds).unwrap();

        assert_eq!(to_lines(&ea), to_lines(&eb));
    }

    #[test]
    fn event_log_tees_every_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");

        let mut engine = Engine::new();
        engine.start_event_log(&path).unwrap();
        let events = engine
            .apply_all(&[
                Command::add_limit(1, Side::Sell, 100, 5),
                Command::add_limit(2, Side::Buy, 100, 5),
                Command::cancel(2),
            ])
            .unwrap();
        engine.stop_event_log().unwrap();

        let logged = fs::read_to_string(&path).unwrap();
        let expected: String = to_lines(&events)
            .iter()
            .map(|l| format!("{l}\n"))
            .collect();
        assert_eq!(logged, expected);
    }

    #[test]
    fn log_is_flushed_after_each_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");

        let mut engine = Engine::new();
        engine.start_event_log(&path).unwrap();
        engine
            .apply(&Command::add_limit(1, Side::Buy, 100, 5))
            .unwrap();

        // readable mid-run, before stop_event_log
        let logged = fs::read_to_string(&path).unwrap();
        assert_eq!(logged.lines().count(), 2); // accepted + resting
    }

    #[test]
    fn start_event_log_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        fs::write(&path, "stale contents\n").unwrap();

        let mut engine = Engine::new();
        engine.start_event_log(&path).unwrap();
        engine.stop_event_log().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
