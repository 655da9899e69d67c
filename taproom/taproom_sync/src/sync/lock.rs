//! A mutex that records how it is used.
//!
//! Each resource in the bar's pool is guarded by one `TrackedMutex`. The
//! statistics make contention on individual resources observable without
//! changing how the lock behaves.

use log::trace;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Statistics about lock usage
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LockStats {
    /// Number of successful lock acquisitions
    pub acquisition_count: usize,

    /// Total time spent waiting for the lock (microseconds)
    pub total_wait_time_us: u64,

    /// Total time the lock was held (microseconds)
    pub total_hold_time_us: u64,

    /// Maximum time spent waiting for the lock (microseconds)
    pub max_wait_time_us: u64,

    /// Maximum time the lock was held (microseconds)
    pub max_hold_time_us: u64,
}

#[derive(Debug, Default)]
struct Counters {
    acquisition_count: AtomicUsize,
    total_wait_time_us: AtomicU64,
    total_hold_time_us: AtomicU64,
    max_wait_time_us: AtomicU64,
    max_hold_time_us: AtomicU64,
}

impl Counters {
    fn record_wait(&self, wait_us: u64) {
        self.acquisition_count.fetch_add(1, Ordering::Relaxed);
        self.total_wait_time_us.fetch_add(wait_us, Ordering::Relaxed);
        self.max_wait_time_us.fetch_max(wait_us, Ordering::Relaxed);
    }

    fn record_hold(&self, hold_us: u64) {
        self.total_hold_time_us.fetch_add(hold_us, Ordering::Relaxed);
        self.max_hold_time_us.fetch_max(hold_us, Ordering::Relaxed);
    }
}

/// A non-reentrant mutex with a name and usage statistics
#[derive(Debug)]
pub struct TrackedMutex<T> {
    mutex: Mutex<T>,
    counters: Counters,
    name: String,
}

/// A guard for a `TrackedMutex`; releasing it records the hold time
pub struct TrackedMutexGuard<'a, T> {
    guard: MutexGuard<'a, T>,
    acquired_at: Instant,
    counters: &'a Counters,
    name: &'a str,
}

impl<T> TrackedMutex<T> {
    /// Create a new tracked mutex with a name for diagnostics
    pub fn new(value: T, name: impl Into<String>) -> Self {
        Self {
            mutex: Mutex::new(value),
            counters: Counters::default(),
            name: name.into(),
        }
    }

    /// Lock the mutex, blocking until it is available
    pub fn lock(&self) -> TrackedMutexGuard<'_, T> {
        let start = Instant::now();
        let guard = self.mutex.lock();
        let wait_time = start.elapsed();
        self.counters.record_wait(wait_time.as_micros() as u64);

        trace!(
            "Lock acquired: {} (wait time: {:.2}ms)",
            self.name,
            wait_time.as_secs_f64() * 1000.0
        );

        self.guard(guard)
    }

    /// Check whether the mutex is currently held
    pub fn is_locked(&self) -> bool {
        self.mutex.is_locked()
    }

    /// Get the statistics for this mutex
    pub fn stats(&self) -> LockStats {
        LockStats {
            acquisition_count: self.counters.acquisition_count.load(Ordering::Relaxed),
            total_wait_time_us: self.counters.total_wait_time_us.load(Ordering::Relaxed),
            total_hold_time_us: self.counters.total_hold_time_us.load(Ordering::Relaxed),
            max_wait_time_us: self.counters.max_wait_time_us.load(Ordering::Relaxed),
            max_hold_time_us: self.counters.max_hold_time_us.load(Ordering::Relaxed),
        }
    }

    /// Get the name of this mutex
    pub fn name(&self) -> &str {
        &self.name
    }

    fn guard<'a>(&'a self, guard: MutexGuard<'a, T>) -> TrackedMutexGuard<'a, T> {
        TrackedMutexGuard {
            guard,
            acquired_at: Instant::now(),
            counters: &self.counters,
            name: &self.name,
        }
    }
}

impl<T> Drop for TrackedMutexGuard<'_, T> {
    fn drop(&mut self) {
        let hold_time = self.acquired_at.elapsed();
        self.counters.record_hold(hold_time.as_micros() as u64);

        trace!(
            "Lock released: {} (held for: {:.2}ms)",
            self.name,
            hold_time.as_secs_f64() * 1000.0
        );
    }
}

impl<T> std::ops::Deref for TrackedMutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<T> std::ops::DerefMut for TrackedMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_tracked_mutex_basic() {
        let mutex = TrackedMutex::new(0, "counter");

        {
            let mut guard = mutex.lock();
            *guard += 1;
        }

        {
            let guard = mutex.lock();
            assert_eq!(*guard, 1);
        }

        assert_eq!(mutex.stats().acquisition_count, 2);
        assert_eq!(mutex.name(), "counter");
    }

    #[test]
    fn test_tracked_mutex_blocks_second_holder() {
        let mutex = Arc::new(TrackedMutex::new((), "resource-1"));
        let guard = mutex.lock();
        assert!(mutex.is_locked());

        let waiter = {
            let mutex = Arc::clone(&mutex);
            thread::spawn(move || {
                let _guard = mutex.lock();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        assert_eq!(mutex.stats().acquisition_count, 1);

        drop(guard);
        waiter.join().unwrap();
        assert!(!mutex.is_locked());

        let stats = mutex.stats();
        assert_eq!(stats.acquisition_count, 2);
        assert!(stats.max_wait_time_us > 0);
    }

    #[test]
    fn test_tracked_mutex_contention() {
        let mutex = Arc::new(TrackedMutex::new(0, "contended"));
        let threads = 8;
        let iterations = 50;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let mutex = Arc::clone(&mutex);
                thread::spawn(move || {
                    for _ in 0..iterations {
                        let mut guard = mutex.lock();
                        *guard += 1;
                        thread::sleep(Duration::from_micros(10));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*mutex.lock(), threads * iterations);

        let stats = mutex.stats();
        assert_eq!(stats.acquisition_count, threads * iterations + 1);
        assert!(stats.total_hold_time_us > 0);
        assert!(stats.max_hold_time_us <= stats.total_hold_time_us);
    }
}
