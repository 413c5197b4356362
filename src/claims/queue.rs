//! FIFO of players awaiting validation.
//!
//! Enqueue checks membership and appends under one lock, so a player can
//! never appear twice. The dealer is the only consumer.

use std::collections::VecDeque;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::core::PlayerId;

#[derive(Debug, Default)]
struct QueueState {
    order: VecDeque<PlayerId>,
    members: FxHashSet<PlayerId>,
}

/// Thread-safe, duplicate-free claim queue.
#[derive(Debug, Default)]
pub struct ClaimQueue {
    inner: Mutex<QueueState>,
}

impl ClaimQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a player unless already queued. Returns whether it was added.
    pub fn enqueue(&self, player: PlayerId) -> bool {
        let mut queue = self.inner.lock();
        if !queue.members.insert(player) {
            return false;
        }
        queue.order.push_back(player);
        true
    }

    /// Remove and return the oldest queued player.
    pub fn poll(&self) -> Option<PlayerId> {
        let mut queue = self.inner.lock();
        let player = queue.order.pop_front()?;
        queue.members.remove(&player);
        Some(player)
    }

    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.inner.lock().members.contains(&player)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().order.is_empty()
    }

    /// Queued players, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PlayerId> {
        self.inner.lock().order.iter().copied().collect()
    }

    /// Drop every queued player.
    pub fn clear(&self) {
        let mut queue = self.inner.lock();
        queue.order.clear();
        queue.members.clear();
    }
}
