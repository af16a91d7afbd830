// CLASSIFICATION: COMMUNITY
// Filename: heap.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Heap epoch tracking for a context group.

use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

/// Heap shared by every context in a group.
///
/// Only the collector advances the reachability barrier; readers get a
/// snapshot hint that may already be stale when used.
#[derive(Debug, Default)]
pub struct Heap {
    reachability_barrier: AtomicU64,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of full reachability passes completed so far.
    pub fn reachability_barrier(&self) -> u64 {
        self.reachability_barrier.load(Ordering::Acquire)
    }

    /// Record the completion of a full reachability pass.
    pub fn collect_all_garbage(&self) -> u64 {
        let epoch = self.reachability_barrier.fetch_add(1, Ordering::Release) + 1;
        debug!("reachability pass complete, epoch {}", epoch);
        epoch
    }
}
