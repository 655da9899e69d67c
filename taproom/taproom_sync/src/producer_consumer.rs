//! Producer/consumer exchange over a single bounded buffer.

use log::{info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};

use taproom_core::{BufferConfig, Result};

use crate::queue::BoundedBuffer;

/// A bounded buffer with a start-up/shut-down lifecycle.
///
/// Producers call [`put`](Self::put) and consumers call [`get`](Self::get)
/// from any number of threads. `startup` and `shutdown` bracket all use;
/// since `shutdown` consumes the value, neither can be called twice.
#[derive(Debug)]
pub struct ProducerConsumer<T> {
    buffer: BoundedBuffer<T>,
    sent: AtomicUsize,
    received: AtomicUsize,
}

impl<T> ProducerConsumer<T> {
    /// Allocate the buffer.
    pub fn startup(config: &BufferConfig) -> Result<Self> {
        config.validate()?;
        let buffer = BoundedBuffer::new(config.capacity)?;
        info!("Producer/consumer buffer started with capacity {}", config.capacity);
        Ok(Self {
            buffer,
            sent: AtomicUsize::new(0),
            received: AtomicUsize::new(0),
        })
    }

    /// Store an item, blocking while the buffer is full.
    pub fn put(&self, item: T) {
        self.buffer.put(item);
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Take the oldest item, blocking while the buffer is empty.
    pub fn get(&self) -> T {
        let item = self.buffer.get();
        self.received.fetch_add(1, Ordering::Relaxed);
        item
    }

    /// Number of items waiting in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if no items are waiting.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Release the buffer, returning any items nobody consumed.
    pub fn shutdown(self) -> Vec<T> {
        let mut leftover = Vec::new();
        while let Some(item) = self.buffer.try_get() {
            leftover.push(item);
        }
        if !leftover.is_empty() {
            warn!("Shutting down with {} unconsumed items", leftover.len());
        }
        info!(
            "Producer/consumer buffer shut down ({} sent, {} received)",
            self.sent.load(Ordering::Relaxed),
            self.received.load(Ordering::Relaxed)
        );
        leftover
    }
}
