//! Bounded memory of recently served candidates.

use std::collections::{HashSet, VecDeque};

use skillswap_matching::ProfileId;

/// FIFO window of recently served ids. The oldest id is evicted first once
/// the window is full.
#[derive(Debug, Clone, PartialEq)]
pub struct RecencyWindow {
    order: VecDeque<ProfileId>,
    members: HashSet<ProfileId>,
    capacity: usize,
}

impl RecencyWindow {
    /// Create an empty window holding at most `capacity` ids (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            members: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Window size for a pool with `eligible` candidates: `max(1, eligible - 2)`.
    ///
    /// Leaves at least two eligible candidates outside the window so a small
    /// pool keeps cycling.
    pub fn bound_for_eligible(eligible: usize) -> usize {
        eligible.saturating_sub(2).max(1)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &ProfileId) -> bool {
        self.members.contains(id)
    }

    /// Ids from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ProfileId> {
        self.order.iter()
    }

    /// Record a served id as the newest entry.
    ///
    /// Re-recording an id moves it to the newest slot. Returns the id evicted
    /// to make room, if any.
    pub fn record(&mut self, id: ProfileId) -> Option<ProfileId> {
        if self.members.contains(&id) {
            self.order.retain(|existing| existing != &id);
        } else {
            self.members.insert(id.clone());
        }
        self.order.push_back(id);
        self.evict_to(self.capacity).pop()
    }

    /// Change the bound, evicting oldest ids if the window shrinks.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<ProfileId> {
        self.capacity = capacity.max(1);
        self.evict_to(self.capacity)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    fn evict_to(&mut self, capacity: usize) -> Vec<ProfileId> {
        let mut evicted = Vec::new();
        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
                evicted.push(oldest);
            }
        }
        evicted
    }
}
