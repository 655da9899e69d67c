//! Lock primitives used for the per-resource locks of the bar.

pub mod lock;

pub use lock::{LockStats, TrackedMutex, TrackedMutexGuard};
