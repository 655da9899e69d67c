#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Taproom Sync
//!
//! Blocking coordination primitives for the Taproom engine.
//!
//! This crate provides:
//!
//! - A fixed-capacity blocking FIFO buffer and the producer/consumer facade over it
//! - An order queue that assigns each admitted order a completion slot
//! - A deadlock-free multi-resource lock set that acquires in ascending identifier order
//! - A completion notifier that wakes exactly the requester whose order was served
//! - The `Bar`, which ties the order queue, lock set, and notifier together
//!
//! Thread creation is left to the caller: requesters call [`Bar::submit_order`] and
//! fulfillment workers loop over [`Bar::take_order`], [`Bar::fulfill_order`] and
//! [`Bar::serve_order`] on threads they spawn themselves.

/// The bar: order queue, resource lock set, and completion notifier
pub mod bar;

/// The producer/consumer facade over a bounded buffer
pub mod producer_consumer;

/// Fixed-capacity blocking FIFO queues
pub mod queue;

/// Lock primitives with usage statistics
pub mod sync;

// Re-export key types for easier access
pub use bar::{Bar, CompletionNotifier, HeldResources, Mixer, ResourceLockSet};
pub use producer_consumer::ProducerConsumer;
pub use queue::{BoundedBuffer, OrderQueue};
pub use sync::{LockStats, TrackedMutex, TrackedMutexGuard};
