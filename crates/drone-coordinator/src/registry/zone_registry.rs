//! Zone registry, spec §4.2: a mapping from zone id to `Zone`. All writes go
//! through this type; external callers never mutate a `Zone` directly.

use drone_domain::grid::derive_implicit_zone;
use drone_domain::{Severity, Zone};
use std::collections::HashMap;
use std::sync::RwLock;

pub struct ZoneRegistry {
    zones: RwLock<HashMap<u32, Zone>>,
    /// Display-only drop counters, reset whenever a zone's fire is cleared.
    /// Spec §4.2: independent of the coordinator's `assigned` bookkeeping,
    /// which remains dispatch-authoritative.
    drop_counts: RwLock<HashMap<u32, u32>>,
}

impl ZoneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            zones: RwLock::new(HashMap::new()),
            drop_counts: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_zones(zones: Vec<Zone>) -> Self {
        let registry = Self::new();
        for zone in zones {
            registry.insert_if_absent(zone);
        }
        registry
    }

    pub fn insert_if_absent(&self, zone: Zone) {
        let mut guard = self.zones.write().expect("zone registry poisoned");
        guard.entry(zone.id).or_insert(zone);
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<Zone> {
        self.zones.read().expect("zone registry poisoned").get(&id).cloned()
    }

    /// Returns the zone for `id`, creating it at a deterministic implicit
    /// center (spec §4.2) if this is the first mention of it.
    #[must_use]
    pub fn get_or_create(&self, id: u32) -> Zone {
        if let Some(zone) = self.get(id) {
            return zone;
        }
        let zone = derive_implicit_zone(id);
        let mut guard = self.zones.write().expect("zone registry poisoned");
        guard.entry(id).or_insert(zone).clone()
    }

    #[must_use]
    pub fn all(&self) -> Vec<Zone> {
        self.zones
            .read()
            .expect("zone registry poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Sets fire status and severity atomically; clearing the fire also
    /// resets the display-only drop counter.
    pub fn update_fire_status(&self, id: u32, has_fire: bool, severity: Severity) {
        {
            let mut guard = self.zones.write().expect("zone registry poisoned");
            let zone = guard
                .entry(id)
                .or_insert_with(|| derive_implicit_zone(id));
            zone.set_fire_status(has_fire, severity);
        }
        if !has_fire {
            self.drop_counts
                .write()
                .expect("drop-count registry poisoned")
                .remove(&id);
        }
    }

    /// Records a display-only drop for `id`; not consulted by dispatch.
    pub fn record_drop(&self, id: u32) -> u32 {
        let mut guard = self.drop_counts.write().expect("drop-count registry poisoned");
        let entry = guard.entry(id).or_insert(0);
        *entry += 1;
        *entry
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_derives_a_deterministic_center_once() {
        let registry = ZoneRegistry::new();
        let first = registry.get_or_create(42);
        let second = registry.get_or_create(42);
        assert_eq!(first.center(), second.center());
    }

    #[test]
    fn clearing_fire_resets_the_drop_counter() {
        let registry = ZoneRegistry::new();
        registry.insert_if_absent(Zone::new(1, 0, 0, 10, 10));
        registry.record_drop(1);
        registry.record_drop(1);
        registry.update_fire_status(1, false, Severity::None);
        assert_eq!(
            *registry
                .drop_counts
                .read()
                .unwrap()
                .get(&1)
                .unwrap_or(&0),
            0
        );
    }
}
