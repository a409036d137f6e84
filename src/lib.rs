//! # matchbook
//!
//! A deterministic, single-threaded limit order book matching engine for a
//! simulated continuous-trading venue.
//!
//! The engine consumes a totally ordered stream of commands (add-limit,
//! cancel) and emits a totally ordered stream of events (accept, trade,
//! resting, completed, maker-completed, cancel, rejections). Given
//! identical input streams it produces byte-identical output streams across
//! runs and platforms: there is no clock, no randomness, no hash-order
//! dependence, and a single monotonic sequence counter drives time
//! priority.
//!
//! ## Layout
//!
//! - [`orders`] — primitive value types and input validation
//! - [`orderbook`] — the price-time-priority book: ordered side maps, FIFO
//!   levels over a slot arena, id index for O(1) cancel
//! - [`engine`] — command dispatch plus the append-only event log
//! - [`codec`] — the stable key=value event line format used for logging
//!   and replay
//! - [`script`] — the command script file format
//! - [`cli`] — script/replay/bench driver modes with contractual exit codes
//!
//! ## Example
//!
//! ```
//! use matchbook::{Command, Engine, Side};
//!
//! let mut engine = Engine::new();
//! let events = engine
//!     .apply_all(&[
//!         Command::add_limit(1, Side::Sell, 100, 10),
//!         Command::add_limit(2, Side::Buy, 150, 4),
//!     ])
//!     .unwrap();
//!
//! // the taker trades at the maker's price, never its own limit
//! assert_eq!(events.iter().filter(|e| e.trade_qty > 0).count(), 1);
//! assert_eq!(engine.book().best_ask(), Some(100));
//! assert_eq!(engine.book().total_qty_at(Side::Sell, 100), 6);
//! ```

pub mod cli;
pub mod codec;
pub mod command;
pub mod engine;
pub mod errors;
pub mod event;
pub mod orderbook;
pub mod orders;
pub mod script;

pub use command::Command;
pub use engine::Engine;
pub use errors::{CliError, EngineError, ScriptError};
pub use event::{Event, EventType, Reason};
pub use orderbook::{BookSnapshot, LevelView, OrderBook};
pub use orders::{Order, OrderId, PriceTicks, Qty, Side};
