//! Events emitted by the engine, one ordered batch per applied command.
//!
//! Every event carries the full wire-record field set; fields that do not
//! apply to a given event type stay at their zero values so the line codec
//! can write all columns unconditionally.

use crate::orders::{OrderId, PriceTicks, Qty, Side};
use serde::{Deserialize, Serialize};

/// The externally visible event categories, exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    OrderAccepted,
    OrderRejected,
    Trade,
    OrderResting,
    OrderCompleted,
    MakerCompleted,
    OrderCancelled,
    CancelRejected,
}

impl EventType {
    /// Stable wire token. These spellings are part of the replay format.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::OrderAccepted => "order_accepted",
            EventType::OrderRejected => "order_rejected",
            EventType::Trade => "trade",
            EventType::OrderResting => "order_resting",
            EventType::OrderCompleted => "order_completed",
            EventType::MakerCompleted => "maker_completed",
            EventType::OrderCancelled => "order_cancelled",
            EventType::CancelRejected => "cancel_rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<EventType> {
        match s {
            "order_accepted" => Some(EventType::OrderAccepted),
            "order_rejected" => Some(EventType::OrderRejected),
            "trade" => Some(EventType::Trade),
            "order_resting" => Some(EventType::OrderResting),
            "order_completed" => Some(EventType::OrderCompleted),
            "maker_completed" => Some(EventType::MakerCompleted),
            "order_cancelled" => Some(EventType::OrderCancelled),
            "cancel_rejected" => Some(EventType::CancelRejected),
            _ => None,
        }
    }
}

/// Reason tokens. Contractual, not diagnostic: replay diffs compare them
/// byte for byte, so the spellings never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    Accepted,
    DuplicateId,
    Invalid,
    Trade,
    Resting,
    Filled,
    Cancelled,
    NotFound,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Accepted => "accepted",
            Reason::DuplicateId => "duplicate_id",
            Reason::Invalid => "invalid",
            Reason::Trade => "trade",
            Reason::Resting => "resting",
            Reason::Filled => "filled",
            Reason::Cancelled => "cancelled",
            Reason::NotFound => "not_found",
        }
    }

    pub fn from_str(s: &str) -> Option<Reason> {
        match s {
            "accepted" => Some(Reason::Accepted),
            "duplicate_id" => Some(Reason::DuplicateId),
            "invalid" => Some(Reason::Invalid),
            "trade" => Some(Reason::Trade),
            "resting" => Some(Reason::Resting),
            "filled" => Some(Reason::Filled),
            "cancelled" => Some(Reason::Cancelled),
            "not_found" => Some(Reason::NotFound),
            _ => None,
        }
    }
}

/// One engine output record.
///
/// The field set is the union over all event types; constructors below fill
/// in what each type uses and leave the rest zeroed (`Side::Buy` for an
/// unused side, matching the wire convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,

    /// Order the event refers to; 0 for trades.
    pub id: OrderId,
    /// Acceptance seq of `id`; cancel reporting reuses the original seq.
    pub seq: u64,

    // add-related context
    pub side: Side,
    pub price_ticks: PriceTicks,
    pub qty: Qty,
    pub remaining_qty: Qty,

    // trade fields, zero unless event_type is Trade
    pub maker_id: OrderId,
    pub maker_seq: u64,
    pub taker_id: OrderId,
    pub taker_seq: u64,
    pub trade_price_ticks: PriceTicks,
    pub trade_qty: Qty,

    pub reason: Reason,
}

impl Event {
    fn base(event_type: EventType, reason: Reason) -> Event {
        Event {
            event_type,
            id: 0,
            seq: 0,
            side: Side::Buy,
            price_ticks: 0,
            qty: 0,
            remaining_qty: 0,
            maker_id: 0,
            maker_seq: 0,
            taker_id: 0,
            taker_seq: 0,
            trade_price_ticks: 0,
            trade_qty: 0,
            reason,
        }
    }

    /// First post-validation event of every accepted add.
    pub fn accepted(id: OrderId, seq: u64, side: Side, price_ticks: PriceTicks, qty: Qty) -> Event {
        Event {
            id,
            seq,
            side,
            price_ticks,
            qty,
            ..Event::base(EventType::OrderAccepted, Reason::Accepted)
        }
    }

    /// Rejection of an add, carrying the input context unchanged.
    pub fn rejected(
        id: OrderId,
        side: Side,
        price_ticks: PriceTicks,
        qty: Qty,
        reason: Reason,
    ) -> Event {
        Event {
            id,
            side,
            price_ticks,
            qty,
            ..Event::base(EventType::OrderRejected, reason)
        }
    }

    /// A fill between one maker and the taker, at the maker's price.
    pub fn trade(
        maker_id: OrderId,
        maker_seq: u64,
        taker_id: OrderId,
        taker_seq: u64,
        trade_price_ticks: PriceTicks,
        trade_qty: Qty,
    ) -> Event {
        Event {
            maker_id,
            maker_seq,
            taker_id,
            taker_seq,
            trade_price_ticks,
            trade_qty,
            ..Event::base(EventType::Trade, Reason::Trade)
        }
    }

    /// Terminal event of an add whose remainder entered the book. `qty` is
    /// the original size, `remaining_qty` what rests.
    pub fn resting(
        id: OrderId,
        seq: u64,
        side: Side,
        price_ticks: PriceTicks,
        qty: Qty,
        remaining_qty: Qty,
    ) -> Event {
        Event {
            id,
            seq,
            side,
            price_ticks,
            qty,
            remaining_qty,
            ..Event::base(EventType::OrderResting, Reason::Resting)
        }
    }

    /// Terminal event of an add fully consumed while matching.
    pub fn completed(
        id: OrderId,
        seq: u64,
        side: Side,
        price_ticks: PriceTicks,
        qty: Qty,
    ) -> Event {
        Event {
            id,
            seq,
            side,
            price_ticks,
            qty,
            ..Event::base(EventType::OrderCompleted, Reason::Filled)
        }
    }

    /// A maker drained to zero during matching; follows its trade event.
    pub fn maker_completed(id: OrderId, seq: u64, side: Side, price_ticks: PriceTicks) -> Event {
        Event {
            id,
            seq,
            side,
            price_ticks,
            ..Event::base(EventType::MakerCompleted, Reason::Filled)
        }
    }

    /// Successful cancel; `qty` is the remainder at the moment of cancel and
    /// `seq` the original acceptance seq.
    pub fn cancelled(
        id: OrderId,
        seq: u64,
        side: Side,
        price_ticks: PriceTicks,
        qty: Qty,
    ) -> Event {
        Event {
            id,
            seq,
            side,
            price_ticks,
            qty,
            ..Event::base(EventType::OrderCancelled, Reason::Cancelled)
        }
    }

    pub fn cancel_rejected(id: OrderId, reason: Reason) -> Event {
        Event {
            id,
            ..Event::base(EventType::CancelRejected, reason)
        }
    }
}
