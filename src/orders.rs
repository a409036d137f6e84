use serde::{Deserialize, Serialize};

/// Order identifier supplied by the caller. `0` is reserved as the invalid
/// sentinel and is never accepted by the book.
pub type OrderId = u64;

/// Price in whole ticks. Valid prices are strictly positive; the engine does
/// no floating-point arithmetic.
pub type PriceTicks = i64;

/// Order quantity. Valid quantities are strictly positive; a resting order's
/// stored quantity is its current remainder.
pub type Qty = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,  //Bid
    Sell, //Ask
}

impl Side {
    /// Stable wire token, shared by the event log and the script format.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    pub fn from_str(s: &str) -> Option<Side> {
        match s {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }
}

/// A resting order record as stored in the book.
///
/// `qty` is the remaining size and stays strictly positive while the order
/// is live. `seq` is assigned by the book at acceptance, never changes, and
/// is the tie-break key for time priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price_ticks: PriceTicks,
    pub qty: Qty,
    pub seq: u64,
}

/// Input validation shared by every add path: non-zero id, positive price,
/// positive quantity. Failures are reported through the caller's event
/// stream, never by panicking.
pub fn valid(id: OrderId, price_ticks: PriceTicks, qty: Qty) -> bool {
    id != 0 && price_ticks > 0 && qty > 0
}
