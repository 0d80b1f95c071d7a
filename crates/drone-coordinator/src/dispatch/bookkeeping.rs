//! Required/assigned unit counts per zone, and the fully-assigned memo set,
//! spec §4.4 invariants I1-I5.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

pub struct DispatchState {
    required: RwLock<HashMap<u32, u32>>,
    assigned: RwLock<HashMap<u32, u32>>,
    fully_assigned: RwLock<HashSet<u32>>,
}

impl DispatchState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            required: RwLock::new(HashMap::new()),
            assigned: RwLock::new(HashMap::new()),
            fully_assigned: RwLock::new(HashSet::new()),
        }
    }

    /// I1: required units only ever grows for a zone, tracking the highest
    /// severity seen so far. Returns the value now on record.
    pub fn grow_required(&self, zone_id: u32, units_required: u32) -> u32 {
        let mut guard = self.required.write().expect("required map poisoned");
        let entry = guard.entry(zone_id).or_insert(0);
        if units_required > *entry {
            *entry = units_required;
        }
        *entry
    }

    /// Defensive ceiling used during reconciliation: required never exceeds
    /// `at_most`. In practice a no-op given `grow_required` already tracks
    /// severity monotonically, but kept literal as the bookkeeping's last
    /// line of defense against a required value that outlived its event.
    pub fn clamp_required(&self, zone_id: u32, at_most: u32) {
        let mut guard = self.required.write().expect("required map poisoned");
        if let Some(entry) = guard.get_mut(&zone_id) {
            if *entry > at_most {
                *entry = at_most;
            }
        }
    }

    #[must_use]
    pub fn required(&self, zone_id: u32) -> u32 {
        *self.required.read().expect("required map poisoned").get(&zone_id).unwrap_or(&0)
    }

    #[must_use]
    pub fn assigned(&self, zone_id: u32) -> u32 {
        *self.assigned.read().expect("assigned map poisoned").get(&zone_id).unwrap_or(&0)
    }

    pub fn set_assigned(&self, zone_id: u32, count: u32) {
        self.assigned.write().expect("assigned map poisoned").insert(zone_id, count);
    }

    pub fn increment_assigned(&self, zone_id: u32) -> u32 {
        let mut guard = self.assigned.write().expect("assigned map poisoned");
        let entry = guard.entry(zone_id).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Floored at zero; a double-decrement (e.g. a late ABANDONED arriving
    /// after a zone was already erased) must never wrap.
    pub fn decrement_assigned(&self, zone_id: u32) -> u32 {
        let mut guard = self.assigned.write().expect("assigned map poisoned");
        let entry = guard.entry(zone_id).or_insert(0);
        *entry = entry.saturating_sub(1);
        *entry
    }

    pub fn mark_fully_assigned(&self, zone_id: u32) {
        self.fully_assigned.write().expect("fully-assigned set poisoned").insert(zone_id);
    }

    pub fn unmark_fully_assigned(&self, zone_id: u32) {
        self.fully_assigned.write().expect("fully-assigned set poisoned").remove(&zone_id);
    }

    #[must_use]
    pub fn is_fully_assigned(&self, zone_id: u32) -> bool {
        self.fully_assigned.read().expect("fully-assigned set poisoned").contains(&zone_id)
    }

    /// I5: clears all bookkeeping for a zone whose fire is now out.
    pub fn erase_zone(&self, zone_id: u32) {
        self.required.write().expect("required map poisoned").remove(&zone_id);
        self.assigned.write().expect("assigned map poisoned").remove(&zone_id);
        self.fully_assigned.write().expect("fully-assigned set poisoned").remove(&zone_id);
    }

    #[must_use]
    pub fn active_zone_ids(&self) -> Vec<u32> {
        self.required.read().expect("required map poisoned").keys().copied().collect()
    }
}

impl Default for DispatchState {
    fn default() -> Self {
        Self::new()
    }
}
