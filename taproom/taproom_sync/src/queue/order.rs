//! Order queue shared by requesters and fulfillment workers.

use log::debug;
use taproom_core::{ConfigError, Order, OrderState, RequesterId};

use super::BoundedBuffer;

/// A bounded FIFO of orders.
///
/// Its capacity equals the maximum number of simultaneously outstanding
/// requesters. On admission each order is given the ring index it occupies
/// as its requester id, so the id doubles as the completion slot the
/// requester waits on. The slot stays reserved after the order is taken,
/// until the requester has picked up the fulfilled order and called
/// [`release`](Self::release), so no two orders in flight share an id.
#[derive(Debug)]
pub struct OrderQueue {
    buffer: BoundedBuffer<Order>,
}

impl OrderQueue {
    /// Create an empty queue with room for `max_requesters` orders.
    pub fn new(max_requesters: usize) -> Result<Self, ConfigError> {
        let buffer = BoundedBuffer::new(max_requesters).map_err(|_| ConfigError::ZeroRequesters)?;
        Ok(Self { buffer })
    }

    /// Admit an order, blocking while the queue is full or the tail slot is
    /// still reserved by an order in flight.
    ///
    /// The order is stamped with its requester id (the tail index at admission)
    /// and marked unfulfilled. Returns the assigned id.
    pub fn submit(&self, mut order: Order) -> RequesterId {
        let slot = self.buffer.put_leased(move |slot| {
            order.requester_id = Some(RequesterId::new(slot));
            order.fulfilled = false;
            order.advance(OrderState::Submitted);
            order
        });
        let id = RequesterId::new(slot);
        debug!("Order admitted for {}", id);
        id
    }

    /// Remove the oldest order, blocking while the queue is empty.
    pub fn take(&self) -> Order {
        let mut order = self.buffer.get();
        order.advance(OrderState::Taken);
        order
    }

    /// Free the slot of a delivered order for the next admission.
    pub fn release(&self, id: RequesterId) {
        self.buffer.release(id.index());
        debug!("Released {}", id);
    }

    /// Number of orders waiting to be taken.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if no orders are waiting.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Maximum number of waiting orders.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_ids_follow_tail_index() {
        let queue = OrderQueue::new(3).unwrap();

        assert_eq!(queue.submit(Order::new(vec![1])), RequesterId::new(0));
        assert_eq!(queue.submit(Order::new(vec![2])), RequesterId::new(1));

        let first = queue.take();
        assert_eq!(first.requested_resources, vec![1]);
        assert_eq!(first.requester_id, Some(RequesterId::new(0)));
        assert_eq!(first.state, OrderState::Taken);

        // head = 1, len = 1: the next tail is 2, then wraps to 0 once the
        // first order has been delivered
        assert_eq!(queue.submit(Order::new(vec![3])), RequesterId::new(2));
        queue.release(RequesterId::new(0));
        assert_eq!(queue.submit(Order::new(vec![4])), RequesterId::new(0));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_submit_resets_fulfilled_flag() {
        let queue = OrderQueue::new(1).unwrap();
        let mut order = Order::new(vec![1]);
        order.fulfilled = true;

        queue.submit(order);
        let taken = queue.take();
        assert!(!taken.fulfilled);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            OrderQueue::new(0),
            Err(ConfigError::ZeroRequesters)
        ));
    }

    #[test]
    fn test_submit_blocks_when_full() {
        let queue = Arc::new(OrderQueue::new(1).unwrap());
        queue.submit(Order::new(vec![1]));

        let submitter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.submit(Order::new(vec![2])))
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.len(), 1);
        assert!(!submitter.is_finished());

        assert_eq!(queue.take().requested_resources, vec![1]);
        queue.release(RequesterId::new(0));
        assert_eq!(submitter.join().unwrap(), RequesterId::new(0));
        assert_eq!(queue.take().requested_resources, vec![2]);
    }

    #[test]
    fn test_taken_order_keeps_its_slot_until_released() {
        let queue = Arc::new(OrderQueue::new(1).unwrap());
        queue.submit(Order::new(vec![1]));
        let taken = queue.take();
        assert!(queue.is_empty());

        let submitter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.submit(Order::new(vec![2])))
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!submitter.is_finished());

        queue.release(taken.requester_id.unwrap());
        assert_eq!(submitter.join().unwrap(), RequesterId::new(0));
    }
}
