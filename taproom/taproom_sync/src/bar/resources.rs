//! Deadlock-free acquisition of multiple pool resources.
//!
//! Every acquirer locks the resources it needs in ascending identifier order.
//! Because all acquisition sites share that one total order, two acquirers
//! with overlapping requests always contend for their common resources in
//! the same sequence and no circular wait can form. Acquirers with disjoint
//! requests never touch the same lock and run in parallel.

use log::trace;
use taproom_core::OrderError;

use crate::sync::{LockStats, TrackedMutex, TrackedMutexGuard};

/// Distinct non-zero identifiers of `request` in ascending order.
///
/// A counting pass over `[1, pool_size]`: slots holding `0` are ignored and
/// duplicates collapse to one entry. Fails on the first identifier above
/// `pool_size`.
///
/// # Examples
///
/// ```
/// use taproom_sync::bar::sort_resources;
///
/// assert_eq!(sort_resources(&[3, 0, 1, 3], 5).unwrap(), vec![1, 3]);
/// ```
pub fn sort_resources(request: &[u32], pool_size: u32) -> Result<Vec<u32>, OrderError> {
    let mut present = vec![false; pool_size as usize + 1];
    for &resource in request {
        if resource > pool_size {
            return Err(OrderError::ResourceOutOfRange {
                resource,
                pool_size,
            });
        }
        present[resource as usize] = true;
    }

    Ok(present
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, wanted)| **wanted)
        .map(|(resource, _)| resource as u32)
        .collect())
}

/// Locks held on behalf of one request.
///
/// Dropping the value releases the locks in descending identifier order.
pub struct HeldResources<'a> {
    guards: Vec<(u32, TrackedMutexGuard<'a, ()>)>,
}

impl HeldResources<'_> {
    /// Identifiers held, ascending.
    pub fn resources(&self) -> Vec<u32> {
        self.guards.iter().map(|(resource, _)| *resource).collect()
    }

    /// Check if the request named no resources.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl Drop for HeldResources<'_> {
    fn drop(&mut self) {
        while let Some((resource, guard)) = self.guards.pop() {
            drop(guard);
            trace!("Released resource {}", resource);
        }
    }
}

/// One independent lock per resource of a fixed pool.
#[derive(Debug)]
pub struct ResourceLockSet {
    locks: Vec<TrackedMutex<()>>,
    max_per_request: usize,
}

impl ResourceLockSet {
    /// Create locks for resources `1..=pool_size`.
    pub fn new(pool_size: u32, max_per_request: usize) -> Self {
        let locks = (1..=pool_size)
            .map(|resource| TrackedMutex::new((), format!("resource-{}", resource)))
            .collect();
        Self {
            locks,
            max_per_request,
        }
    }

    /// Number of resources in the pool.
    pub fn pool_size(&self) -> u32 {
        self.locks.len() as u32
    }

    /// Acquire every distinct resource named in `request`.
    ///
    /// Blocks until all of them are held. The request is checked before any
    /// lock is taken, so a rejected request holds nothing.
    pub fn acquire(&self, request: &[u32]) -> Result<HeldResources<'_>, OrderError> {
        if request.len() > self.max_per_request {
            return Err(OrderError::TooManyResources {
                count: request.len(),
                max: self.max_per_request,
            });
        }

        let ordered = sort_resources(request, self.pool_size())?;
        let mut guards = Vec::with_capacity(ordered.len());
        for resource in ordered {
            guards.push((resource, self.lock_for(resource).lock()));
            trace!("Acquired resource {}", resource);
        }

        Ok(HeldResources { guards })
    }

    /// Usage statistics of one resource lock, `None` outside the pool.
    pub fn stats(&self, resource: u32) -> Option<LockStats> {
        let index = (resource as usize).checked_sub(1)?;
        self.locks.get(index).map(TrackedMutex::stats)
    }

    /// Check whether a resource is currently held by some acquirer.
    pub fn is_held(&self, resource: u32) -> bool {
        (resource as usize)
            .checked_sub(1)
            .and_then(|index| self.locks.get(index))
            .is_some_and(TrackedMutex::is_locked)
    }

    fn lock_for(&self, resource: u32) -> &TrackedMutex<()> {
        // sort_resources has already bounded the identifier to [1, pool_size]
        &self.locks[resource as usize - 1]
    }
}
