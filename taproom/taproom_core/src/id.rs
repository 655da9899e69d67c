//! Strongly-typed identifiers.
//!
//! A requester is identified by the wait slot it was given on admission to the
//! order queue. Slots are reused once the previous holder has been delivered, so an
//! identifier is only unique among in-flight orders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a requester's completion slot.
///
/// # Examples
///
/// ```
/// use taproom_core::id::RequesterId;
///
/// let id = RequesterId::new(3);
/// assert_eq!(id.index(), 3);
/// assert_eq!(id.to_string(), "requester-3");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(usize);

impl RequesterId {
    /// Create an identifier for the given slot index.
    pub fn new(slot: usize) -> Self {
        Self(slot)
    }

    /// The slot index this identifier addresses.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for RequesterId {
    fn from(slot: usize) -> Self {
        Self(slot)
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "requester-{}", self.0)
    }
}
