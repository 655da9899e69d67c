//! Targeted completion signaling.
//!
//! Every requester waits on its own condition variable, so serving one order
//! wakes exactly the requester that placed it. The slots share one mutex,
//! which also closes the window between a requester's last check and its wait:
//! a completion stored before the requester starts waiting is seen by the check
//! rather than lost.

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};
use taproom_core::{Order, OrderState, RequesterId};

struct Slots {
    /// Fulfilled orders not yet picked up, one per requester
    ready: Vec<Option<Order>>,
    /// Times each requester's wait returned
    wakeups: Vec<usize>,
}

/// Per-requester completion slots.
pub struct CompletionNotifier {
    slots: Mutex<Slots>,
    conditions: Vec<Condvar>,
}

impl CompletionNotifier {
    /// Create one slot for each of `max_requesters` requesters.
    pub fn new(max_requesters: usize) -> Self {
        Self {
            slots: Mutex::new(Slots {
                ready: (0..max_requesters).map(|_| None).collect(),
                wakeups: vec![0; max_requesters],
            }),
            conditions: (0..max_requesters).map(|_| Condvar::new()).collect(),
        }
    }

    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.conditions.len()
    }

    /// Block until the order for `id` has been signaled, then take it.
    ///
    /// The returned order has `fulfilled == true` and the slot is empty again.
    /// At most one order may be outstanding per slot.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not address a slot of this notifier.
    pub fn await_completion(&self, id: RequesterId) -> Order {
        let index = id.index();
        assert!(index < self.slot_count(), "{} has no completion slot", id);

        let mut slots = self.slots.lock();
        loop {
            if let Some(order) = slots.ready[index].take() {
                return order;
            }
            self.conditions[index].wait(&mut slots);
            slots.wakeups[index] += 1;
        }
    }

    /// Mark the order fulfilled and wake only the requester that placed it.
    ///
    /// An order without a requester id, or one whose id has no slot, was never
    /// admitted through the order queue; it is logged and dropped.
    pub fn signal_completion(&self, mut order: Order) {
        let Some(id) = order.requester_id else {
            warn!("Dropping completion for an order that was never admitted");
            return;
        };
        let index = id.index();
        if index >= self.slot_count() {
            warn!("Dropping completion for {}: no such slot", id);
            return;
        }

        order.fulfilled = true;
        order.advance(OrderState::Fulfilled);

        let mut slots = self.slots.lock();
        // The order queue reserves a slot until its order is picked up
        debug_assert!(
            slots.ready[index].is_none(),
            "{} still holds an undelivered order",
            id
        );
        slots.ready[index] = Some(order);
        self.conditions[index].notify_one();
        debug!("Signaled completion for {}", id);
    }

    /// Number of times the requester in slot `id` was woken.
    pub fn wakeups(&self, id: RequesterId) -> usize {
        self.slots
            .lock()
            .wakeups
            .get(id.index())
            .copied()
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for CompletionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock();
        let pending = slots.ready.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("CompletionNotifier")
            .field("slots", &self.slot_count())
            .field("pending", &pending)
            .finish()
    }
}
