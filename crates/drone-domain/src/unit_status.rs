//! A unit's authoritative status record, as held in the unit registry, §3.

use crate::error_kind::ErrorKind;
use crate::fire_event::FireEvent;
use crate::location::Location;
use crate::unit_spec::UnitSpec;
use crate::unit_state::UnitState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStatus {
    pub drone_id: String,
    pub current_location: Location,
    pub target_location: Location,
    pub state: UnitState,
    pub current_task: Option<FireEvent>,
    pub zones_serviced: u32,
    pub last_update_time: String,
    pub spec: UnitSpec,
    pub error_kind: ErrorKind,
}

impl UnitStatus {
    #[must_use]
    pub fn new(drone_id: impl Into<String>, at: Location) -> Self {
        Self {
            drone_id: drone_id.into(),
            current_location: at,
            target_location: at,
            state: UnitState::Idle,
            current_task: None,
            zones_serviced: 0,
            last_update_time: String::new(),
            spec: UnitSpec::standard(),
            error_kind: ErrorKind::None,
        }
    }

    /// Per §3: idle, not hard-faulted, and not already holding a task.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state == UnitState::Idle
            && self.error_kind != ErrorKind::NozzleJam
            && self.current_task.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_with_no_task_and_no_hard_fault_is_available() {
        let u = UnitStatus::new("drone1", Location::new(0, 0));
        assert!(u.is_available());
    }

    #[test]
    fn hard_fault_makes_an_idle_unit_unavailable() {
        let mut u = UnitStatus::new("drone1", Location::new(0, 0));
        u.error_kind = ErrorKind::NozzleJam;
        assert!(!u.is_available());
    }

    #[test]
    fn holding_a_task_makes_a_unit_unavailable() {
        let mut u = UnitStatus::new("drone1", Location::new(0, 0));
        u.current_task = Some(FireEvent::new(
            "09:00:00",
            1,
            crate::severity::Severity::Low,
        ));
        assert!(!u.is_available());
    }
}
