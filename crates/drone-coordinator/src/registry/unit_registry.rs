//! Unit registry, spec §4.2: the coordinator's view of every drone's last
//! known status. Telemetry handling is the authoritative writer; the
//! dispatch engine also writes optimistically right after sending an
//! assignment, so a second dispatch decision doesn't have to wait on a
//! telemetry round trip to see a unit as taken (see DESIGN.md).

use drone_domain::UnitStatus;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct UnitRegistry {
    units: RwLock<HashMap<String, UnitStatus>>,
}

impl UnitRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn get(&self, drone_id: &str) -> Option<UnitStatus> {
        self.units.read().expect("unit registry poisoned").get(drone_id).cloned()
    }

    pub fn register_if_absent(&self, status: UnitStatus) {
        let mut guard = self.units.write().expect("unit registry poisoned");
        guard.entry(status.drone_id.clone()).or_insert(status);
    }

    /// Replaces the stored status wholesale; used after a telemetry datagram
    /// updates location/state/task in one shot.
    pub fn upsert(&self, status: UnitStatus) {
        let mut guard = self.units.write().expect("unit registry poisoned");
        guard.insert(status.drone_id.clone(), status);
    }

    /// Applies `f` to the unit's status under a single write lock, avoiding
    /// a read-then-write race between two telemetry datagrams for the same
    /// drone. No I/O may happen inside `f`.
    pub fn mutate<F>(&self, drone_id: &str, f: F)
    where
        F: FnOnce(&mut UnitStatus),
    {
        let mut guard = self.units.write().expect("unit registry poisoned");
        if let Some(status) = guard.get_mut(drone_id) {
            f(status);
        }
    }

    #[must_use]
    pub fn all(&self) -> Vec<UnitStatus> {
        self.units
            .read()
            .expect("unit registry poisoned")
            .values()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn available(&self) -> Vec<UnitStatus> {
        self.all().into_iter().filter(UnitStatus::is_available).collect()
    }

    /// Number of units currently holding a task for `zone_id`, regardless of
    /// mission phase (`EnRoute`, `DroppingAgent`, or returning).
    #[must_use]
    pub fn count_assigned_to_zone(&self, zone_id: u32) -> u32 {
        self.units
            .read()
            .expect("unit registry poisoned")
            .values()
            .filter(|u| u.current_task.as_ref().is_some_and(|t| t.zone_id == zone_id))
            .count() as u32
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_domain::{FireEvent, Location, Severity};

    fn make_unit(id: &str) -> UnitStatus {
        UnitStatus::new(id.to_string(), Location::new(0, 0))
    }

    #[test]
    fn register_if_absent_does_not_clobber_existing_state() {
        let registry = UnitRegistry::new();
        registry.register_if_absent(make_unit("drone1"));
        let mut changed = make_unit("drone1");
        changed.zones_serviced = 5;
        registry.register_if_absent(changed);
        assert_eq!(registry.get("drone1").unwrap().zones_serviced, 0);
    }

    #[test]
    fn count_assigned_to_zone_counts_only_matching_tasks() {
        let registry = UnitRegistry::new();
        let mut a = make_unit("drone1");
        a.current_task = Some(FireEvent::new("10:00:00".into(), 3, Severity::High));
        let mut b = make_unit("drone2");
        b.current_task = Some(FireEvent::new("10:00:00".into(), 4, Severity::High));
        registry.upsert(a);
        registry.upsert(b);
        assert_eq!(registry.count_assigned_to_zone(3), 1);
        assert_eq!(registry.count_assigned_to_zone(4), 1);
        assert_eq!(registry.count_assigned_to_zone(9), 0);
    }
}
