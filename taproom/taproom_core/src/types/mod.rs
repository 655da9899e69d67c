//! Core data types for Taproom.
//!
//! This module defines the order that requesters hand to the bar and the
//! lifecycle states it moves through until delivery.

pub mod order;

pub use order::{Order, OrderState};
