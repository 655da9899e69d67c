//! The bar: requesters place orders for subsets of a shared resource pool and
//! fulfillment workers serve them.
//!
//! An order travels through three components:
//!
//! - `OrderQueue`: admits the order and assigns its completion slot
//! - `ResourceLockSet`: gives the worker exclusive use of the named resources
//!   while the `Mixer` runs
//! - `CompletionNotifier`: hands the fulfilled order back to exactly the
//!   requester that placed it

pub mod notifier;
pub mod resources;

pub use notifier::CompletionNotifier;
pub use resources::{sort_resources, HeldResources, ResourceLockSet};

use log::{debug, info};
use std::sync::atomic::{AtomicUsize, Ordering};

use taproom_core::{BarConfig, Order, OrderState, Result};

use crate::queue::OrderQueue;

/// The mixing step run once an order's resources are held.
///
/// Implementations may assume nobody else touches the order's resources for
/// the duration of the call, and nothing more.
pub trait Mixer: Send + Sync {
    /// Fill the order, typically by writing its `mixture`.
    fn mix(&self, order: &mut Order);
}

impl<F> Mixer for F
where
    F: Fn(&mut Order) + Send + Sync,
{
    fn mix(&self, order: &mut Order) {
        self(order)
    }
}

/// Shared state for requesters and fulfillment workers.
///
/// Built once with [`Bar::open`] and shared (typically behind an `Arc`) by
/// every requester and worker thread; [`Bar::close`] consumes it.
pub struct Bar<M: Mixer> {
    config: BarConfig,
    orders: OrderQueue,
    resources: ResourceLockSet,
    notifier: CompletionNotifier,
    mixer: M,
    served: AtomicUsize,
}

impl<M: Mixer> Bar<M> {
    /// Validate the configuration and allocate the queue, resource locks,
    /// and completion slots.
    pub fn open(config: BarConfig, mixer: M) -> Result<Self> {
        config.validate()?;

        let bar = Self {
            orders: OrderQueue::new(config.max_requesters)?,
            resources: ResourceLockSet::new(config.pool_size, config.max_resources_per_order),
            notifier: CompletionNotifier::new(config.max_requesters),
            mixer,
            served: AtomicUsize::new(0),
            config,
        };

        info!(
            "Bar open: {} requesters, {} resources, up to {} resources per order",
            bar.config.max_requesters, bar.config.pool_size, bar.config.max_resources_per_order
        );
        Ok(bar)
    }

    /// Place an order and block until it has been fulfilled.
    ///
    /// On return `order` holds the fulfilled order: its requester id, the
    /// mixer's output, and `fulfilled == true`. A malformed order is rejected
    /// before it is queued. A previously delivered order may be submitted again.
    pub fn submit_order(&self, order: &mut Order) -> Result<()> {
        order.validate(&self.config)?;
        if order.state.is_terminal() {
            order.state = OrderState::Created;
        }

        let id = self.orders.submit(std::mem::take(order));
        let mut fulfilled = self.notifier.await_completion(id);
        self.orders.release(id);
        fulfilled.advance(OrderState::Delivered);
        *order = fulfilled;
        Ok(())
    }

    /// Block until an order is available and take it.
    pub fn take_order(&self) -> Order {
        self.orders.take()
    }

    /// Run the mixer on the order while holding exactly its resources.
    ///
    /// Resources are locked in ascending identifier order and released in
    /// descending order once the mixer returns. A request the pool cannot
    /// satisfy is rejected before any lock is taken, leaving the order
    /// `Taken`.
    pub fn fulfill_order(&self, order: &mut Order) -> Result<()> {
        let _held = self.resources.acquire(&order.requested_resources)?;
        order.advance(OrderState::Fulfilling);
        self.mixer.mix(order);
        Ok(())
    }

    /// Hand a fulfilled order back to the requester waiting for it.
    pub fn serve_order(&self, order: Order) {
        self.served.fetch_add(1, Ordering::Relaxed);
        self.notifier.signal_completion(order);
    }

    /// Take, fulfill, and serve the next order.
    pub fn serve_next(&self) -> Result<()> {
        let mut order = self.take_order();
        self.fulfill_order(&mut order)?;
        self.serve_order(order);
        Ok(())
    }

    /// Number of orders served so far.
    pub fn served(&self) -> usize {
        self.served.load(Ordering::Relaxed)
    }

    /// The configuration the bar was opened with.
    pub fn config(&self) -> &BarConfig {
        &self.config
    }

    /// The resource locks, for inspecting contention.
    pub fn resources(&self) -> &ResourceLockSet {
        &self.resources
    }

    /// The completion slots.
    pub fn notifier(&self) -> &CompletionNotifier {
        &self.notifier
    }

    /// Tear the bar down once every requester has gone home.
    pub fn close(self) {
        let waiting = self.orders.len();
        if waiting > 0 {
            debug!("Closing with {} orders never taken", waiting);
        }
        info!("Bar closed after serving {} orders", self.served());
    }
}

impl<M: Mixer> std::fmt::Debug for Bar<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bar")
            .field("config", &self.config)
            .field("orders", &self.orders)
            .field("notifier", &self.notifier)
            .field("served", &self.served())
            .finish()
    }
}
