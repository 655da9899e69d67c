//! Blocking bounded buffer over circular storage.

use log::{trace, warn};
use parking_lot::{Condvar, Mutex};
use std::fmt;

use taproom_core::ConfigError;

/// Circular storage with a head index and a size counter.
///
/// A slot can also be leased: it then stays unavailable to leased puts after
/// its item has been removed, until the lease is released.
struct Ring<T> {
    slots: Vec<Option<T>>,
    leased: Vec<bool>,
    head: usize,
    len: usize,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            leased: vec![false; capacity],
            head: 0,
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index the next pushed item will occupy.
    fn tail(&self) -> usize {
        (self.head + self.len) % self.capacity()
    }

    /// Check if a leased put may use the tail slot.
    fn tail_available(&self) -> bool {
        !self.is_full() && !self.leased[self.tail()]
    }

    fn push(&mut self, item: T) {
        debug_assert!(!self.is_full());
        let tail = self.tail();
        self.slots[tail] = Some(item);
        self.len += 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        item
    }
}

/// A fixed-capacity blocking FIFO queue.
///
/// `put` blocks while the buffer is full and `get` blocks while it is empty.
/// Every wait rechecks its condition after waking, and each state change
/// wakes a single waiter on the opposite side.
///
/// # Examples
///
/// ```
/// use taproom_sync::BoundedBuffer;
///
/// let buffer = BoundedBuffer::new(2).unwrap();
/// buffer.put("first");
/// buffer.put("second");
/// assert!(buffer.is_full());
/// assert_eq!(buffer.get(), "first");
/// ```
pub struct BoundedBuffer<T> {
    ring: Mutex<Ring<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedBuffer<T> {
    /// Create an empty buffer holding at most `capacity` items.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            ring: Mutex::new(Ring::with_capacity(capacity)),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    /// Append an item at the tail, blocking while the buffer is full.
    pub fn put(&self, item: T) {
        self.put_with(|_| item);
    }

    /// Append the item built by `make`, blocking while the buffer is full.
    ///
    /// `make` runs under the buffer lock and receives the ring index the item
    /// is about to occupy, which is also returned.
    pub(crate) fn put_with<F>(&self, make: F) -> usize
    where
        F: FnOnce(usize) -> T,
    {
        let mut ring = self.ring.lock();
        while ring.is_full() {
            self.not_full.wait(&mut ring);
        }

        let slot = ring.tail();
        ring.push(make(slot));
        trace!("Buffer put at slot {} (len {})", slot, ring.len);

        self.not_empty.notify_one();
        slot
    }

    /// Append the item built by `make` and lease its slot.
    ///
    /// Blocks while the buffer is full or the tail slot is still leased. The
    /// slot stays leased after the item is taken, until [`release`] is called
    /// with the returned index, so no two live leases share a slot.
    ///
    /// [`release`]: Self::release
    pub(crate) fn put_leased<F>(&self, make: F) -> usize
    where
        F: FnOnce(usize) -> T,
    {
        let mut ring = self.ring.lock();
        while !ring.tail_available() {
            self.not_full.wait(&mut ring);
        }

        let slot = ring.tail();
        ring.leased[slot] = true;
        ring.push(make(slot));
        trace!("Buffer put at leased slot {} (len {})", slot, ring.len);

        self.not_empty.notify_one();
        // The new tail may already be free; pass the turn on
        if ring.tail_available() {
            self.not_full.notify_one();
        }
        slot
    }

    /// Give back a slot leased by [`put_leased`](Self::put_leased).
    pub(crate) fn release(&self, slot: usize) {
        let mut ring = self.ring.lock();
        match ring.leased.get_mut(slot) {
            Some(leased) if *leased => *leased = false,
            _ => {
                warn!("Release of slot {} which holds no lease", slot);
                return;
            }
        }
        trace!("Buffer slot {} released", slot);

        if slot == ring.tail() && ring.tail_available() {
            self.not_full.notify_one();
        }
    }

    /// Remove the item at the head, blocking while the buffer is empty.
    pub fn get(&self) -> T {
        let mut ring = self.ring.lock();
        loop {
            if let Some(item) = ring.pop() {
                trace!("Buffer get (len {})", ring.len);
                self.not_full.notify_one();
                return item;
            }
            self.not_empty.wait(&mut ring);
        }
    }

    /// Append an item if there is room, otherwise hand it back.
    pub fn try_put(&self, item: T) -> Result<(), T> {
        let mut ring = self.ring.lock();
        if ring.is_full() {
            return Err(item);
        }
        ring.push(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove the head item if there is one.
    pub fn try_get(&self) -> Option<T> {
        let mut ring = self.ring.lock();
        let item = ring.pop()?;
        self.not_full.notify_one();
        Some(item)
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.ring.lock().len
    }

    /// Check if the buffer holds no items.
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    /// Check if the buffer is at capacity.
    pub fn is_full(&self) -> bool {
        self.ring.lock().is_full()
    }

    /// Maximum number of items the buffer holds.
    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }
}

impl<T> fmt::Debug for BoundedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("BoundedBuffer")
            .field("capacity", &ring.capacity())
            .field("len", &ring.len)
            .field("head", &ring.head)
            .field("leased", &ring.leased.iter().filter(|leased| **leased).count())
            .finish()
    }
}
