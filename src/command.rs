use crate::orders::{OrderId, PriceTicks, Qty, Side};
use serde::{Deserialize, Serialize};

/// A single input record for the engine. Commands arrive in a totally
/// ordered stream; the engine applies them one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Submit a new limit order.
    AddLimit {
        id: OrderId,
        side: Side,
        price_ticks: PriceTicks,
        qty: Qty,
    },
    /// Cancel a resting order by id.
    Cancel { id: OrderId },
}

impl Command {
    pub fn add_limit(id: OrderId, side: Side, price_ticks: PriceTicks, qty: Qty) -> Self {
        Command::AddLimit {
            id,
            side,
            price_ticks,
            qty,
        }
    }

    pub fn cancel(id: OrderId) -> Self {
        Command::Cancel { id }
    }
}
