//! Stable key=value text form for [`Event`] records.
//!
//! One event per line, every column always present, unused values written as
//! literal `0` (`buy` for an unused side). The column order is fixed; replay
//! correctness depends on this serialization being byte-identical across
//! runs and platforms, so nothing here may vary with locale, platform, or
//! hash ordering.

use crate::event::{Event, EventType, Reason};
use crate::orders::Side;
use std::fmt::Write as _;

/// Serialize an event to its line form, without the trailing newline.
pub fn event_to_line(e: &Event) -> String {
    let mut out = String::with_capacity(128);

    // infallible: fmt::Write on String cannot fail
    let _ = write!(
        out,
        "type={} id={} seq={} side={} px={} qty={} rem={} \
         maker={} maker_seq={} taker={} taker_seq={} tpx={} tq={} reason={}",
        e.event_type.as_str(),
        e.id,
        e.seq,
        e.side.as_str(),
        e.price_ticks,
        e.qty,
        e.remaining_qty,
        e.maker_id,
        e.maker_seq,
        e.taker_id,
        e.taker_seq,
        e.trade_price_ticks,
        e.trade_qty,
        e.reason.as_str(),
    );
    out
}

/// Pulls the next `key=value` token and checks the key. Any drift from the
/// written format is a parse failure.
fn next_value<'a>(tokens: &mut impl Iterator<Item = &'a str>, key: &str) -> Option<&'a str> {
    let token = tokens.next()?;
    let (k, v) = token.split_once('=')?;
    if k != key {
        return None;
    }
    Some(v)
}

fn next_u64<'a>(tokens: &mut impl Iterator<Item = &'a str>, key: &str) -> Option<u64> {
    next_value(tokens, key)?.parse().ok()
}

fn next_i64<'a>(tokens: &mut impl Iterator<Item = &'a str>, key: &str) -> Option<i64> {
    next_value(tokens, key)?.parse().ok()
}

/// Parse a line produced by [`event_to_line`]. Returns `None` on any
/// deviation: wrong key order, missing columns, trailing tokens, unknown
/// type/side/reason tokens, or unparseable numbers.
pub fn line_to_event(line: &str) -> Option<Event> {
    let mut tokens = line.split_whitespace();

    let event_type = EventType::from_str(next_value(&mut tokens, "type")?)?;
    let id = next_u64(&mut tokens, "id")?;
    let seq = next_u64(&mut tokens, "seq")?;
    let side = Side::from_str(next_value(&mut tokens, "side")?)?;
    let price_ticks = next_i64(&mut tokens, "px")?;
    let qty = next_i64(&mut tokens, "qty")?;
    let remaining_qty = next_i64(&mut tokens, "rem")?;
    let maker_id = next_u64(&mut tokens, "maker")?;
    let maker_seq = next_u64(&mut tokens, "maker_seq")?;
    let taker_id = next_u64(&mut tokens, "taker")?;
    let taker_seq = next_u64(&mut tokens, "taker_seq")?;
    let trade_price_ticks = next_i64(&mut tokens, "tpx")?;
    let trade_qty = next_i64(&mut tokens, "tq")?;
    let reason = Reason::from_str(next_value(&mut tokens, "reason")?)?;

    if tokens.next().is_some() {
        return None;
    }

    Some(Event {
        event_type,
        id,
        seq,
        side,
        price_ticks,
        qty,
        remaining_qty,
        maker_id,
        maker_seq,
        taker_id,
        taker_seq,
        trade_price_ticks,
        trade_qty,
        reason,
    })
}
