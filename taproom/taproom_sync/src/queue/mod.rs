//! Fixed-capacity blocking FIFO queues.
//!
//! - `BoundedBuffer`: a circular buffer of opaque items guarded by one mutex
//!   and two condition variables
//! - `OrderQueue`: a `BoundedBuffer` of orders that assigns each admitted order
//!   the completion slot it will wait on

pub mod bounded;
pub mod order;

pub use bounded::BoundedBuffer;
pub use order::OrderQueue;
