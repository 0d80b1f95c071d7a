//! End-to-end dispatch scenarios, spec §8. Each test stands up a coordinator
//! from its bare components (no process, no global state) and a loopback UDP
//! socket standing in for a drone, per the "no global singletons, in-memory
//! transport doubles" design note. Drone numbers are kept distinct and high
//! across tests to avoid port collisions when tests run concurrently.

use drone_coordinator::dispatch::{DispatchEngine, DispatchState, PriorityQueue};
use drone_coordinator::registry::{UnitRegistry, ZoneRegistry};
use drone_domain::{ErrorKind, FireEvent, Location, Severity, UnitState, UnitStatus, Zone};
use drone_protocol::ports::unit_receive_port;
use drone_protocol::{decode_fire_event, Transport};
use std::sync::Arc;
use std::time::Duration;

async fn bind_drone_receiver(drone_number: u32) -> Transport {
    let port = unit_receive_port(drone_number);
    Transport::bind(0, port)
        .await
        .expect("fixed drone port must be free in test environment")
}

fn idle_unit(drone_number: u32, at: Location) -> UnitStatus {
    UnitStatus::new(format!("drone{drone_number}"), at)
}

#[tokio::test]
async fn s1_single_low_fire_one_unit_available() {
    let zones = Arc::new(ZoneRegistry::with_zones(vec![Zone::new(1, 0, 0, 10, 10)]));
    let units = Arc::new(UnitRegistry::new());
    units.register_if_absent(idle_unit(901, Location::new(0, 0)));

    let state = Arc::new(DispatchState::new());
    let queue = Arc::new(PriorityQueue::new());
    let coordinator_transport = Arc::new(Transport::bind(0, 0).await.unwrap());
    let drone = bind_drone_receiver(901).await;

    let engine = DispatchEngine::new(zones, units, state.clone(), queue.clone(), coordinator_transport);

    engine.ingest_fire_event(FireEvent::new("09:00:00", 1, Severity::Low));
    engine.process_one().await;

    assert_eq!(state.required(1), 1);
    assert_eq!(state.assigned(1), 1);
    assert!(state.is_fully_assigned(1));

    let inbound = drone
        .recv(Duration::from_millis(200))
        .await
        .unwrap()
        .expect("drone901 should have received an assignment");
    let event = decode_fire_event(&inbound.text).unwrap();
    assert_eq!(event.zone_id, 1);
    assert_eq!(event.severity, Severity::Low);
}

#[tokio::test]
async fn s2_high_fire_requires_three_distinct_units() {
    let zones = Arc::new(ZoneRegistry::with_zones(vec![Zone::new(4, 0, 0, 10, 10)]));
    let units = Arc::new(UnitRegistry::new());
    for n in 910..915 {
        units.register_if_absent(idle_unit(n, Location::new(0, 0)));
    }

    let state = Arc::new(DispatchState::new());
    let queue = Arc::new(PriorityQueue::new());
    let coordinator_transport = Arc::new(Transport::bind(0, 0).await.unwrap());
    let drones: Vec<Transport> = {
        let mut v = Vec::new();
        for n in 910..915 {
            v.push(bind_drone_receiver(n).await);
        }
        v
    };

    let engine = DispatchEngine::new(zones, units, state.clone(), queue.clone(), coordinator_transport);
    engine.ingest_fire_event(FireEvent::new("09:00:00", 4, Severity::High));
    engine.process_one().await;

    assert_eq!(state.required(4), 3);
    assert_eq!(state.assigned(4), 3);
    assert!(state.is_fully_assigned(4));

    let mut recipients = 0;
    for drone in &drones {
        if let Ok(Some(inbound)) = drone.recv(Duration::from_millis(100)).await {
            let event = decode_fire_event(&inbound.text).unwrap();
            assert_eq!(event.zone_id, 4);
            recipients += 1;
        }
    }
    assert_eq!(recipients, 3, "exactly three of the five idle units should be dispatched");
}

#[tokio::test]
async fn s3_severity_upgrade_dispatches_two_more_without_redispatching_the_first() {
    let zones = Arc::new(ZoneRegistry::with_zones(vec![Zone::new(2, 0, 0, 10, 10)]));
    let units = Arc::new(UnitRegistry::new());
    for n in 920..924 {
        units.register_if_absent(idle_unit(n, Location::new(0, 0)));
    }

    let state = Arc::new(DispatchState::new());
    let queue = Arc::new(PriorityQueue::new());
    let coordinator_transport = Arc::new(Transport::bind(0, 0).await.unwrap());
    let mut drones = Vec::new();
    for n in 920..924 {
        drones.push(bind_drone_receiver(n).await);
    }

    let engine = DispatchEngine::new(zones, units, state.clone(), queue.clone(), coordinator_transport);

    engine.ingest_fire_event(FireEvent::new("09:00:00", 2, Severity::Low));
    engine.process_one().await;
    assert_eq!(state.required(2), 1);
    assert_eq!(state.assigned(2), 1);

    engine.ingest_fire_event(FireEvent::new("09:00:01", 2, Severity::High));
    engine.process_one().await;
    assert_eq!(state.required(2), 3);
    assert_eq!(state.assigned(2), 3);

    let mut total_assignments = 0;
    for drone in &drones {
        while let Ok(Some(inbound)) = drone.recv(Duration::from_millis(50)).await {
            let event = decode_fire_event(&inbound.text).unwrap();
            assert_eq!(event.zone_id, 2);
            total_assignments += 1;
        }
    }
    assert_eq!(total_assignments, 3, "three unique units total, no re-dispatch of the first");
}

#[tokio::test]
async fn s4_redirection_from_low_to_high_pulls_an_en_route_unit() {
    let zones = Arc::new(ZoneRegistry::with_zones(vec![
        Zone::new(10, 0, 0, 10, 10),
        Zone::new(11, 100, 100, 10, 10),
    ]));
    let units = Arc::new(UnitRegistry::new());
    units.register_if_absent(idle_unit(940, Location::new(0, 0)));

    let state = Arc::new(DispatchState::new());
    let queue = Arc::new(PriorityQueue::new());
    let coordinator_transport = Arc::new(Transport::bind(0, 0).await.unwrap());
    let drone = bind_drone_receiver(940).await;

    let engine = DispatchEngine::new(zones, units.clone(), state.clone(), queue.clone(), coordinator_transport);

    // The only unit in the fleet is sent to a low-severity fire in zone 10.
    engine.ingest_fire_event(FireEvent::new("09:00:00", 10, Severity::Low));
    engine.process_one().await;
    assert_eq!(state.assigned(10), 1);
    let first = drone
        .recv(Duration::from_millis(200))
        .await
        .unwrap()
        .expect("drone940 should have received the zone 10 assignment");
    assert_eq!(decode_fire_event(&first.text).unwrap().zone_id, 10);

    // Telemetry reporting the unit under way hasn't landed yet, but the
    // dispatch engine already recorded it as tasked (the optimistic write),
    // so a high-severity fire elsewhere has no idle candidate to pick from.
    assert!(!units.get("drone940").unwrap().is_available());

    // A high-severity fire breaks out in zone 11. No idle unit exists, so
    // reconciliation must redirect the unit already en route to the
    // lower-severity zone 10 fire.
    engine.ingest_fire_event(FireEvent::new("09:00:05", 11, Severity::High));
    engine.process_one().await;
    assert_eq!(state.assigned(11), 0, "no idle unit available yet");

    engine.reconcile_active_fires().await;
    assert_eq!(state.assigned(11), 1, "the en-route unit should have been redirected");
    assert_eq!(state.assigned(10), 0, "zone 10's assignment should have been released");

    let redirect = drone
        .recv(Duration::from_millis(200))
        .await
        .unwrap()
        .expect("drone940 should have received the redirection to zone 11");
    assert_eq!(decode_fire_event(&redirect.text).unwrap().zone_id, 11);

    let unit = units.get("drone940").unwrap();
    assert_eq!(unit.current_task.as_ref().map(|t| t.zone_id), Some(11));
}

#[tokio::test]
async fn s5_hard_faulted_unit_is_never_selected_again() {
    let zones = Arc::new(ZoneRegistry::with_zones(vec![Zone::new(5, 0, 0, 10, 10)]));
    let units = Arc::new(UnitRegistry::new());
    units.register_if_absent(idle_unit(930, Location::new(0, 0)));
    units.register_if_absent(idle_unit(931, Location::new(0, 0)));

    let state = Arc::new(DispatchState::new());
    let queue = Arc::new(PriorityQueue::new());
    let coordinator_transport = Arc::new(Transport::bind(0, 0).await.unwrap());
    let drone_a = bind_drone_receiver(930).await;
    let drone_b = bind_drone_receiver(931).await;

    let engine = DispatchEngine::new(zones, units.clone(), state.clone(), queue.clone(), coordinator_transport);
    engine.ingest_fire_event(FireEvent::new("09:00:00", 5, Severity::Low));
    engine.process_one().await;
    assert_eq!(state.assigned(5), 1);

    // Whichever unit was picked reports a hard fault; mark it faulted and
    // drop the zone's assignment count the way telemetry handling would.
    let faulted_id = if drone_a.recv(Duration::from_millis(100)).await.unwrap().is_some() {
        "drone930"
    } else {
        "drone931"
    };
    units.mutate(faulted_id, |u| {
        u.error_kind = ErrorKind::NozzleJam;
        u.state = UnitState::Fault;
        u.current_task = None;
    });
    state.decrement_assigned(5);
    state.unmark_fully_assigned(5);

    assert!(!units.get(faulted_id).unwrap().is_available());

    engine.reconcile_active_fires().await;
    assert_eq!(state.assigned(5), 1, "a second unit should have been dispatched");

    let other = if faulted_id == "drone930" { &drone_b } else { &drone_a };
    let inbound = other.recv(Duration::from_millis(200)).await.unwrap();
    assert!(inbound.is_some(), "the non-faulted unit should receive the reassignment");
}

#[tokio::test]
async fn s6_idempotent_fire_out_leaves_state_unchanged_on_second_delivery() {
    let zones = Arc::new(ZoneRegistry::with_zones(vec![Zone::new(7, 0, 0, 10, 10)]));
    zones.update_fire_status(7, true, Severity::Low);
    let state = Arc::new(DispatchState::new());
    state.grow_required(7, 1);
    state.increment_assigned(7);
    let queue = Arc::new(PriorityQueue::new());

    zones.update_fire_status(7, false, Severity::None);
    state.erase_zone(7);
    queue.purge_zone(7);

    let after_first = (state.required(7), state.assigned(7), state.is_fully_assigned(7));

    // Second, late FIRE_OUT:7 delivery.
    zones.update_fire_status(7, false, Severity::None);
    state.erase_zone(7);
    queue.purge_zone(7);

    let after_second = (state.required(7), state.assigned(7), state.is_fully_assigned(7));
    assert_eq!(after_first, after_second);
    assert_eq!(after_second, (0, 0, false));
}
