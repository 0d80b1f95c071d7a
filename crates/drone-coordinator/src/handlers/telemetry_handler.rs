//! Telemetry datagram handling, spec §4.4/§5: the coordinator's single
//! writer for unit state, and the trigger point for idle reassignment,
//! zone clearing, and redirection bookkeeping.

use crate::registry::{UnitRegistry, ZoneRegistry};
use drone_domain::{FireEvent, Severity, UnitState};
use drone_protocol::Telemetry;
use tokio::sync::mpsc::Sender;
use tracing::info;

use crate::dispatch::{DispatchState, PriorityQueue};

pub async fn handle_telemetry(
    telemetry: Telemetry,
    zones: &ZoneRegistry,
    units: &UnitRegistry,
    state: &DispatchState,
    queue: &PriorityQueue,
    idle_followup: &Sender<String>,
) {
    let drone_id = telemetry.drone_id.clone();

    units.register_if_absent(drone_domain::UnitStatus::new(
        drone_id.clone(),
        telemetry.location,
    ));

    if let Some(zone_id) = telemetry.fire_out {
        zones.update_fire_status(zone_id, false, Severity::None);
        state.erase_zone(zone_id);
        queue.purge_zone(zone_id);
        info!(zone_id, "fire reported out");
    }

    if let Some(zone_id) = telemetry.abandoned {
        state.decrement_assigned(zone_id);
        state.unmark_fully_assigned(zone_id);
    }

    let new_state: Option<UnitState> = telemetry.state_name.parse().ok();

    let mut became_idle_with_prior_task = false;
    units.mutate(&drone_id, |unit| {
        unit.current_location = telemetry.location;
        unit.last_update_time = telemetry.state_name.clone();
        if let Some(err) = telemetry.error {
            unit.error_kind = err;
        }
        if let Some(capacity) = telemetry.capacity_litres {
            unit.spec.current_capacity = capacity;
        }
        if let Some((zone_id, severity)) = telemetry.task {
            unit.current_task = Some(FireEvent::new(String::new(), zone_id, severity));
        }

        if let Some(next) = new_state {
            if unit.state.can_transition_to(next) || unit.state == next {
                if next == UnitState::Idle {
                    // Spec §4.4 step 6: a unit going idle after holding a
                    // task releases that zone's assignment count, mirroring
                    // the ABANDONED branch above.
                    if let Some(finished) = unit.current_task.take() {
                        unit.zones_serviced += 1;
                        became_idle_with_prior_task = true;
                        state.decrement_assigned(finished.zone_id);
                        state.unmark_fully_assigned(finished.zone_id);
                    }
                }
                unit.state = next;
            }
        }
    });

    if became_idle_with_prior_task {
        let _ = idle_followup.try_send(drone_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ZoneRegistry;
    use drone_domain::{Location, UnitStatus, Zone};

    fn harness() -> (ZoneRegistry, UnitRegistry, DispatchState, PriorityQueue, Sender<String>, tokio::sync::mpsc::Receiver<String>) {
        let (tx, rx) = tokio::sync::mpsc::channel(16);
        (
            ZoneRegistry::with_zones(vec![Zone::new(9, 0, 0, 10, 10)]),
            UnitRegistry::new(),
            DispatchState::new(),
            PriorityQueue::new(),
            tx,
            rx,
        )
    }

    #[tokio::test]
    async fn fire_out_erases_the_zone_and_purges_the_queue() {
        let (zones, units, state, queue, tx, _rx) = harness();
        state.grow_required(9, 1);
        state.increment_assigned(9);
        queue.push(FireEvent::new("09:00:00", 9, Severity::Low));

        let telemetry = Telemetry::new("drone1", "EnRoute", Location::new(0, 0)).with_fire_out(9);
        handle_telemetry(telemetry, &zones, &units, &state, &queue, &tx).await;

        assert_eq!(state.required(9), 0);
        assert_eq!(state.assigned(9), 0);
        assert!(!zones.get(9).unwrap().has_fire);
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn abandoned_releases_the_old_zones_assignment() {
        let (zones, units, state, queue, tx, _rx) = harness();
        state.increment_assigned(9);
        state.mark_fully_assigned(9);

        let telemetry = Telemetry::new("drone1", "EnRoute", Location::new(0, 0)).with_abandoned(9);
        handle_telemetry(telemetry, &zones, &units, &state, &queue, &tx).await;

        assert_eq!(state.assigned(9), 0);
        assert!(!state.is_fully_assigned(9));
    }

    #[tokio::test]
    async fn going_idle_after_a_task_releases_its_zones_assignment_and_schedules_a_followup() {
        let (zones, units, state, queue, tx, mut rx) = harness();
        let mut unit = UnitStatus::new("drone1", Location::new(0, 0));
        unit.state = UnitState::ArrivedToBase;
        unit.current_task = Some(FireEvent::new("09:00:00", 9, Severity::Low));
        units.upsert(unit);
        state.increment_assigned(9);
        state.mark_fully_assigned(9);

        let telemetry = Telemetry::new("drone1", "Idle", Location::new(0, 0));
        handle_telemetry(telemetry, &zones, &units, &state, &queue, &tx).await;

        assert_eq!(state.assigned(9), 0);
        assert!(!state.is_fully_assigned(9));
        assert!(units.get("drone1").unwrap().current_task.is_none());
        assert_eq!(rx.try_recv().unwrap(), "drone1");
    }

    #[tokio::test]
    async fn unknown_unit_is_registered_implicitly() {
        let (zones, units, state, queue, tx, _rx) = harness();
        let telemetry = Telemetry::new("drone42", "Idle", Location::new(3, 4));
        handle_telemetry(telemetry, &zones, &units, &state, &queue, &tx).await;
        assert_eq!(units.get("drone42").unwrap().current_location, Location::new(3, 4));
    }
}
