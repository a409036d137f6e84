use crate::event::{Event, Reason};
use crate::orders::{self, Order, OrderId, PriceTicks, Qty, Side};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Sentinel slot index used as the list terminator.
const NIL: u32 = u32::MAX;

/// One storage cell in the arena. Live slots hold an order plus its FIFO
/// links; free slots reuse `next` to thread the free list.
struct Slot {
    order: Order,
    prev: u32,
    next: u32,
    in_use: bool,
}

/// Slab of order slots with an intrusive free list. Slot indices are the
/// stable handles the index maps order ids to: allocating or freeing one
/// slot never moves another, so a handle stays valid for the whole life of
/// its order.
struct Arena {
    slots: Vec<Slot>,
    free_head: u32,
}

impl Arena {
    fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free_head: NIL,
        }
    }

    fn alloc(&mut self, order: Order) -> u32 {
        if self.free_head != NIL {
            let idx = self.free_head;
            let slot = &mut self.slots[idx as usize];
            self.free_head = slot.next;
            slot.order = order;
            slot.prev = NIL;
            slot.next = NIL;
            slot.in_use = true;
            return idx;
        }
        let idx = u32::try_from(self.slots.len()).expect("arena capacity exceeded u32 range");
        self.slots.push(Slot {
            order,
            prev: NIL,
            next: NIL,
            in_use: true,
        });
        idx
    }

    fn free(&mut self, idx: u32) {
        let slot = &mut self.slots[idx as usize];
        slot.in_use = false;
        slot.prev = NIL;
        slot.next = self.free_head;
        self.free_head = idx;
    }

    fn order(&self, idx: u32) -> &Order {
        &self.slots[idx as usize].order
    }

    fn order_mut(&mut self, idx: u32) -> &mut Order {
        &mut self.slots[idx as usize].order
    }
}

/// An insertion-ordered sequence of live orders at one price on one side,
/// as a doubly linked list through arena slots. Never left empty inside a
/// side map.
struct Level {
    head: u32,
    tail: u32,
    len: usize,
}

impl Level {
    fn new() -> Self {
        Level {
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn front(&self) -> Option<u32> {
        (self.head != NIL).then_some(self.head)
    }

    fn push_back(&mut self, idx: u32, arena: &mut Arena) {
        let slot = &mut arena.slots[idx as usize];
        slot.prev = self.tail;
        slot.next = NIL;
        if self.tail == NIL {
            self.head = idx;
        } else {
            arena.slots[self.tail as usize].next = idx;
        }
        self.tail = idx;
        self.len += 1;
    }

    /// Detach `idx` wherever it sits in the list. O(1); neighbours keep
    /// their handles.
    fn unlink(&mut self, idx: u32, arena: &mut Arena) {
        let (prev, next) = {
            let slot = &arena.slots[idx as usize];
            (slot.prev, slot.next)
        };
        if prev == NIL {
            self.head = next;
        } else {
            arena.slots[prev as usize].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            arena.slots[next as usize].prev = prev;
        }
        self.len -= 1;
    }
}

/// Walks a level's slots front to back.
struct LevelIter<'a> {
    arena: &'a Arena,
    cur: u32,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (u32, &'a Order);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == NIL {
            return None;
        }
        let idx = self.cur;
        let slot = &self.arena.slots[idx as usize];
        self.cur = slot.next;
        Some((idx, &slot.order))
    }
}

/// Aggregate view of one price level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelView {
    pub price_ticks: PriceTicks,
    pub total_qty: Qty,
    pub orders: usize,
}

/// Point-in-time depth view, best price first on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSnapshot {
    pub bids: Vec<LevelView>,
    pub asks: Vec<LevelView>,
}

/// A price-time-priority limit order book.
///
/// Bids and asks are price-ordered [`BTreeMap`]s of FIFO [`Level`]s; the
/// best bid is the largest bid key, the best ask the smallest ask key. An
/// id→slot index gives cancels O(1) access to the order's list node, so no
/// operation ever scans a level to find an order.
///
/// `add_limit` and `cancel` return the ordered event list describing
/// everything that happened; the caller (normally [`crate::engine::Engine`])
/// decides what to do with it. Given the same call sequence, two books
/// produce identical event streams.
pub struct OrderBook {
    bids: BTreeMap<PriceTicks, Level>,
    asks: BTreeMap<PriceTicks, Level>,
    arena: Arena,
    index: HashMap<OrderId, u32>,
    next_seq: u64,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            arena: Arena::new(),
            index: HashMap::new(),
            next_seq: 1,
        }
    }

    /// Submits a limit order: validate, match against the opposite side
    /// while the limit crosses, then rest any remainder.
    ///
    /// Event order within the returned list is fixed: rejection is a single
    /// event; otherwise `OrderAccepted` first, then per-maker `Trade`
    /// (followed by `MakerCompleted` when the maker is drained) in
    /// price-then-FIFO order, then exactly one terminal `OrderResting` or
    /// `OrderCompleted`.
    pub fn add_limit(
        &mut self,
        id: OrderId,
        side: Side,
        price_ticks: PriceTicks,
        qty: Qty,
    ) -> Vec<Event> {
        let mut events = Vec::new();

        if !orders::valid(id, price_ticks, qty) {
            warn!(id, ?side, price_ticks, qty, "add rejected: invalid input");
            events.push(Event::rejected(id, side, price_ticks, qty, Reason::Invalid));
            return events;
        }
        if self.index.contains_key(&id) {
            warn!(id, "add rejected: duplicate id");
            events.push(Event::rejected(
                id,
                side,
                price_ticks,
                qty,
                Reason::DuplicateId,
            ));
            return events;
        }

        // The seq is consumed even if the order never rests; full fills do
        // not recycle it.
        let taker_seq = self.next_seq;
        self.next_seq += 1;
        events.push(Event::accepted(id, taker_seq, side, price_ticks, qty));

        let mut remaining = qty;
        while remaining > 0 {
            let best = match side {
                Side::Buy => self.asks.first_key_value().map(|(px, _)| *px),
                Side::Sell => self.bids.last_key_value().map(|(px, _)| *px),
            };
            let Some(level_px) = best else { break };
            // Non-strict on purpose: a limit that exactly touches the top of
            // the opposite book still takes.
            let crosses = match side {
                Side::Buy => level_px <= price_ticks,
                Side::Sell => level_px >= price_ticks,
            };
            if !crosses {
                break;
            }

            let opposite = match side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };
            remaining = Self::sweep_level(
                opposite,
                &mut self.arena,
                &mut self.index,
                level_px,
                id,
                taker_seq,
                remaining,
                &mut events,
            );
        }

        if remaining > 0 {
            let order = Order {
                id,
                side,
                price_ticks,
                qty: remaining,
                seq: taker_seq,
            };
            let slot = self.arena.alloc(order);
            let book_side = match side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            book_side
                .entry(price_ticks)
                .or_insert_with(Level::new)
                .push_back(slot, &mut self.arena);
            self.index.insert(id, slot);
            debug!(id, seq = taker_seq, ?side, price_ticks, remaining, "order resting");
            events.push(Event::resting(
                id,
                taker_seq,
                side,
                price_ticks,
                qty,
                remaining,
            ));
        } else {
            debug!(id, seq = taker_seq, "taker fully filled");
            events.push(Event::completed(id, taker_seq, side, price_ticks, qty));
        }

        #[cfg(debug_assertions)]
        self.check_invariants();
        events
    }

    /// Fills the taker against the FIFO queue at `level_px`, emitting a
    /// `Trade` per maker touched and a `MakerCompleted` for each maker
    /// drained to zero. Removes the level from the map once emptied.
    #[allow(clippy::too_many_arguments)]
    fn sweep_level(
        levels: &mut BTreeMap<PriceTicks, Level>,
        arena: &mut Arena,
        index: &mut HashMap<OrderId, u32>,
        level_px: PriceTicks,
        taker_id: OrderId,
        taker_seq: u64,
        mut remaining: Qty,
        events: &mut Vec<Event>,
    ) -> Qty {
        let mut emptied = false;
        if let Some(level) = levels.get_mut(&level_px) {
            while remaining > 0 {
                let Some(head) = level.front() else { break };

                let fill = remaining.min(arena.order(head).qty);
                let maker = {
                    let m = arena.order_mut(head);
                    m.qty -= fill;
                    *m
                };
                remaining -= fill;
                debug!(
                    maker = maker.id,
                    taker = taker_id,
                    px = level_px,
                    fill,
                    "trade"
                );
                // Trades execute at the maker's price regardless of how
                // aggressive the taker's limit is.
                events.push(Event::trade(
                    maker.id, maker.seq, taker_id, taker_seq, level_px, fill,
                ));

                if maker.qty == 0 {
                    level.unlink(head, arena);
                    arena.free(head);
                    index.remove(&maker.id);
                    events.push(Event::maker_completed(
                        maker.id,
                        maker.seq,
                        maker.side,
                        maker.price_ticks,
                    ));
                }
            }
            emptied = level.is_empty();
        }
        if emptied {
            levels.remove(&level_px);
        }
        remaining
    }

    /// Cancels a resting order through its stable handle; never scans.
    /// Reports the original acceptance seq and the remaining quantity at
    /// the moment of cancel. Does not advance the seq counter.
    pub fn cancel(&mut self, id: OrderId) -> Vec<Event> {
        let mut events = Vec::new();

        if id == 0 {
            warn!("cancel rejected: invalid id");
            events.push(Event::cancel_rejected(0, Reason::Invalid));
            return events;
        }
        let Some(&slot) = self.index.get(&id) else {
            warn!(id, "cancel rejected: not found");
            events.push(Event::cancel_rejected(id, Reason::NotFound));
            return events;
        };

        let order = *self.arena.order(slot);
        let book_side = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = book_side
            .get_mut(&order.price_ticks)
            .expect("invariant: live order has a level");
        level.unlink(slot, &mut self.arena);
        let emptied = level.is_empty();
        if emptied {
            book_side.remove(&order.price_ticks);
        }
        self.arena.free(slot);
        self.index.remove(&id);

        debug!(id, seq = order.seq, "order cancelled");
        events.push(Event::cancelled(
            id,
            order.seq,
            order.side,
            order.price_ticks,
            order.qty,
        ));

        #[cfg(debug_assertions)]
        self.check_invariants();
        events
    }

    pub fn best_bid(&self) -> Option<PriceTicks> {
        self.bids.last_key_value().map(|(px, _)| *px)
    }

    pub fn best_ask(&self) -> Option<PriceTicks> {
        self.asks.first_key_value().map(|(px, _)| *px)
    }

    pub fn live_count(&self) -> usize {
        self.index.len()
    }

    pub fn has(&self, id: OrderId) -> bool {
        self.index.contains_key(&id)
    }

    fn level(&self, side: Side, price_ticks: PriceTicks) -> Option<&Level> {
        match side {
            Side::Buy => self.bids.get(&price_ticks),
            Side::Sell => self.asks.get(&price_ticks),
        }
    }

    fn level_orders(&self, level: &Level) -> LevelIter<'_> {
        LevelIter {
            arena: &self.arena,
            cur: level.head,
        }
    }

    /// Ids at one exact level in time priority; empty if no such level.
    pub fn ids_at(&self, side: Side, price_ticks: PriceTicks) -> Vec<OrderId> {
        self.level(side, price_ticks)
            .map(|level| self.level_orders(level).map(|(_, o)| o.id).collect())
            .unwrap_or_default()
    }

    /// Sum of remaining quantity at one exact level; 0 if no such level.
    pub fn total_qty_at(&self, side: Side, price_ticks: PriceTicks) -> Qty {
        self.level(side, price_ticks)
            .map(|level| self.level_orders(level).map(|(_, o)| o.qty).sum())
            .unwrap_or(0)
    }

    /// Depth view with best prices first on both sides. Non-mutating; does
    /// not touch any handle.
    pub fn snapshot(&self) -> BookSnapshot {
        let view = |(&price_ticks, level): (&PriceTicks, &Level)| LevelView {
            price_ticks,
            total_qty: self.level_orders(level).map(|(_, o)| o.qty).sum(),
            orders: level.len,
        };
        BookSnapshot {
            bids: self.bids.iter().rev().map(view).collect(),
            asks: self.asks.iter().map(view).collect(),
        }
    }

    /// Full structural audit, wired into every mutation in debug builds. A
    /// failure here is an implementation bug, not a recoverable condition.
    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        let mut total = 0usize;
        for (side, map) in [(Side::Buy, &self.bids), (Side::Sell, &self.asks)] {
            for (&px, level) in map {
                assert!(!level.is_empty(), "empty level left in map at {px}");
                let mut seen = 0usize;
                for (idx, order) in self.level_orders(level) {
                    assert!(self.arena.slots[idx as usize].in_use);
                    assert_eq!(order.side, side);
                    assert_eq!(order.price_ticks, px);
                    assert!(order.qty > 0, "non-positive resting qty for {}", order.id);
                    assert_ne!(order.seq, 0);
                    assert_eq!(
                        self.index.get(&order.id),
                        Some(&idx),
                        "index disagrees with level for {}",
                        order.id
                    );
                    seen += 1;
                }
                assert_eq!(seen, level.len);
                total += seen;
            }
        }
        assert_eq!(total, self.index.len(), "index out of sync with levels");
        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            assert!(bid < ask, "crossed book: bid {bid} >= ask {ask}");
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
