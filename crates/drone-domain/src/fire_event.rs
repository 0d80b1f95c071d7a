//! Fire events: ingestion requests, implicit proactive reassignments, and
//! redirections, §3.

use crate::error_kind::ErrorKind;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireEvent {
    pub time: String,
    pub zone_id: u32,
    pub event_type: String,
    pub severity: Severity,
    pub error_kind: ErrorKind,
    /// Units already known to be assigned to this event instance; a given
    /// drone id never appears twice (invariant I6).
    pub assigned_units: Vec<String>,
}

impl FireEvent {
    #[must_use]
    pub fn new(time: impl Into<String>, zone_id: u32, severity: Severity) -> Self {
        Self {
            time: time.into(),
            zone_id,
            event_type: "FIRE".to_string(),
            severity,
            error_kind: ErrorKind::None,
            assigned_units: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_error_kind(mut self, error_kind: ErrorKind) -> Self {
        self.error_kind = error_kind;
        self
    }

    #[must_use]
    pub fn with_assigned_units(mut self, units: Vec<String>) -> Self {
        self.assigned_units = units;
        self
    }

    /// Records a unit assignment, enforcing invariant I6 (no duplicate ids).
    pub fn assign_unit(&mut self, drone_id: impl Into<String>) {
        let drone_id = drone_id.into();
        if !self.assigned_units.contains(&drone_id) {
            self.assigned_units.push(drone_id);
        }
    }

    /// The key spec §3/§9 orders the dispatch queue by: higher severity
    /// weight first, ties broken by ascending time. Callers needing a total
    /// order additionally break ties with a monotonic sequence number.
    #[must_use]
    pub fn priority_key(&self) -> (u32, &str) {
        (self.severity.weight(), self.time.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigning_the_same_unit_twice_is_a_no_op() {
        let mut e = FireEvent::new("09:00:00", 1, Severity::Low);
        e.assign_unit("drone1");
        e.assign_unit("drone1");
        assert_eq!(e.assigned_units, vec!["drone1".to_string()]);
    }

    #[test]
    fn priority_key_orders_by_severity_then_time() {
        let high = FireEvent::new("09:00:05", 1, Severity::High);
        let low_earlier = FireEvent::new("09:00:00", 2, Severity::Low);
        assert!(high.priority_key().0 > low_earlier.priority_key().0);
    }
}
