//! Orders and their lifecycle.

use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::BarConfig;
use crate::error::OrderError;
use crate::id::RequesterId;

/// Order state in the lifecycle.
///
/// The lifecycle is strictly linear: every order moves from `Created` to
/// `Delivered` through each intermediate state exactly once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderState {
    /// Built by a requester, not yet admitted.
    #[default]
    Created,

    /// Waiting in the order queue.
    Submitted,

    /// Dequeued by a fulfillment worker.
    Taken,

    /// Resources held, mixing in progress.
    Fulfilling,

    /// Resources released and the fulfilled flag set.
    Fulfilled,

    /// Observed by the requester.
    Delivered,
}

impl OrderState {
    /// The state that follows this one, or `None` for `Delivered`.
    pub fn next(&self) -> Option<OrderState> {
        match self {
            Self::Created => Some(Self::Submitted),
            Self::Submitted => Some(Self::Taken),
            Self::Taken => Some(Self::Fulfilling),
            Self::Fulfilling => Some(Self::Fulfilled),
            Self::Fulfilled => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Check if this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Submitted => write!(f, "Submitted"),
            Self::Taken => write!(f, "Taken"),
            Self::Fulfilling => write!(f, "Fulfilling"),
            Self::Fulfilled => write!(f, "Fulfilled"),
            Self::Delivered => write!(f, "Delivered"),
        }
    }
}

/// A request for exclusive use of a subset of the resource pool.
///
/// `requested_resources` is a fixed-length list of slots where `0` marks an
/// unused slot and any other value names a resource in `[1, pool_size]`.
/// Duplicates are allowed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Wait slot assigned on admission, `None` before submission.
    pub requester_id: Option<RequesterId>,

    /// Requested resource slots.
    pub requested_resources: Vec<u32>,

    /// Output written by the mixing step.
    pub mixture: Vec<u32>,

    /// Set when the order has been served.
    pub fulfilled: bool,

    /// Current lifecycle state.
    pub state: OrderState,
}

impl Order {
    /// Create a new order for the given resource slots.
    pub fn new(requested_resources: impl Into<Vec<u32>>) -> Self {
        Self {
            requested_resources: requested_resources.into(),
            ..Default::default()
        }
    }

    /// Check the order against the bar's limits.
    ///
    /// Rejects requests with more slots than `max_resources_per_order` and
    /// identifiers beyond `pool_size`. Empty slots are always accepted.
    pub fn validate(&self, config: &BarConfig) -> Result<(), OrderError> {
        let count = self.requested_resources.len();
        if count > config.max_resources_per_order {
            return Err(OrderError::TooManyResources {
                count,
                max: config.max_resources_per_order,
            });
        }

        match self
            .requested_resources
            .iter()
            .find(|&&resource| resource > config.pool_size)
        {
            Some(&resource) => Err(OrderError::ResourceOutOfRange {
                resource,
                pool_size: config.pool_size,
            }),
            None => Ok(()),
        }
    }

    /// Move the order to its next lifecycle state.
    pub fn advance(&mut self, next: OrderState) {
        debug_assert_eq!(
            self.state.next(),
            Some(next),
            "illegal order transition {} -> {}",
            self.state,
            next
        );
        trace!(
            "Order {}: {} -> {}",
            self.requester_label(),
            self.state,
            next
        );
        self.state = next;
    }

    fn requester_label(&self) -> String {
        self.requester_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unadmitted".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BarConfig {
        BarConfig {
            max_requesters: 4,
            pool_size: 5,
            max_resources_per_order: 3,
        }
    }

    #[test]
    fn test_state_sequence_is_linear() {
        let mut state = OrderState::Created;
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            assert!(next > state);
            state = next;
            seen.push(state);
        }
        assert_eq!(seen.len(), 6);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_validate_accepts_empty_and_duplicate_slots() {
        assert!(Order::new(vec![0, 0, 0]).validate(&config()).is_ok());
        assert!(Order::new(vec![2, 2, 5]).validate(&config()).is_ok());
        assert!(Order::new(Vec::<u32>::new()).validate(&config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let result = Order::new(vec![1, 6, 0]).validate(&config());
        assert_eq!(
            result,
            Err(OrderError::ResourceOutOfRange {
                resource: 6,
                pool_size: 5
            })
        );
    }

    #[test]
    fn test_validate_rejects_oversized_request() {
        let result = Order::new(vec![1, 2, 3, 4]).validate(&config());
        assert_eq!(result, Err(OrderError::TooManyResources { count: 4, max: 3 }));
    }

    #[test]
    fn test_advance_follows_lifecycle() {
        let mut order = Order::new(vec![1]);
        order.advance(OrderState::Submitted);
        order.requester_id = Some(RequesterId::new(0));
        order.advance(OrderState::Taken);
        assert_eq!(order.state, OrderState::Taken);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "illegal order transition")]
    fn test_advance_rejects_skipped_state() {
        let mut order = Order::new(vec![1]);
        order.advance(OrderState::Fulfilled);
    }
}
