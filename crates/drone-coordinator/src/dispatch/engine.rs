//! The dispatch engine, spec §4.4: turns fire events into unit assignments
//! and keeps required/assigned bookkeeping consistent as units report in.

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::registry::{UnitRegistry, ZoneRegistry};
use drone_domain::{FireEvent, Severity, UnitState, UnitStatus};
use drone_protocol::ports::unit_receive_port;
use drone_protocol::Transport;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::bookkeeping::DispatchState;
use super::queue::PriorityQueue;

pub struct DispatchEngine {
    zones: Arc<ZoneRegistry>,
    units: Arc<UnitRegistry>,
    state: Arc<DispatchState>,
    queue: Arc<PriorityQueue>,
    transport: Arc<Transport>,
}

impl DispatchEngine {
    #[must_use]
    pub fn new(
        zones: Arc<ZoneRegistry>,
        units: Arc<UnitRegistry>,
        state: Arc<DispatchState>,
        queue: Arc<PriorityQueue>,
        transport: Arc<Transport>,
    ) -> Self {
        Self {
            zones,
            units,
            state,
            queue,
            transport,
        }
    }

    /// Entry point for an incoming fire event datagram: records the zone's
    /// fire status and queues the event for dispatch.
    pub fn ingest_fire_event(&self, event: FireEvent) {
        self.zones
            .update_fire_status(event.zone_id, true, event.severity);
        self.state
            .grow_required(event.zone_id, event.severity.units_required());
        self.queue.push(event);
    }

    /// Pops one event off the queue and attempts to fully dispatch it.
    pub async fn process_one(&self) {
        let Some(event) = self.queue.pop() else {
            return;
        };
        self.update_zone_and_required(&event);
        self.dispatch(event).await;
    }

    /// I1: the required count for a zone only ever grows, tracking the
    /// highest severity an event for it has carried.
    fn update_zone_and_required(&self, event: &FireEvent) {
        self.zones
            .update_fire_status(event.zone_id, true, event.severity);
        self.state
            .grow_required(event.zone_id, event.severity.units_required());
    }

    /// Assigns as many available units as the zone still needs. Leaves the
    /// remainder queued implicitly via the fully-assigned memo being unset,
    /// so a later reconciliation pass can retry.
    async fn dispatch(&self, mut event: FireEvent) {
        let zone_id = event.zone_id;
        let assigned_now = self.units.count_assigned_to_zone(zone_id);
        self.state.set_assigned(zone_id, assigned_now);

        let required = self.state.required(zone_id);
        if assigned_now >= required {
            self.state.mark_fully_assigned(zone_id);
            return;
        }

        let mut excluded: Vec<String> = event.assigned_units.clone();
        let mut still_needed = required - assigned_now;

        while still_needed > 0 {
            let Some(candidate) = self.select_best(zone_id, &excluded) else {
                break;
            };
            match self.send_assignment(&candidate.drone_id, &event).await {
                Ok(()) => {
                    event.assign_unit(candidate.drone_id.clone());
                    self.mark_unit_tasked(&candidate.drone_id, &event);
                    excluded.push(candidate.drone_id.clone());
                    self.state.increment_assigned(zone_id);
                    still_needed -= 1;
                }
                Err(e) => {
                    warn!(drone_id = %candidate.drone_id, error = %e, "assignment send failed");
                    excluded.push(candidate.drone_id);
                }
            }
        }

        if self.state.assigned(zone_id) >= self.state.required(zone_id) {
            self.state.mark_fully_assigned(zone_id);
        } else {
            self.state.unmark_fully_assigned(zone_id);
        }
    }

    /// Candidate ranking, spec §4.4: fewest zones serviced first (load
    /// balancing), ties broken by distance then drone id for determinism.
    fn select_best(&self, zone_id: u32, exclude: &[String]) -> Option<UnitStatus> {
        let zone = self.zones.get_or_create(zone_id);
        let center = zone.center();

        let mut candidates: Vec<UnitStatus> = self
            .units
            .available()
            .into_iter()
            .filter(|u| !exclude.contains(&u.drone_id))
            .collect();

        candidates.sort_by(|a, b| {
            a.zones_serviced
                .cmp(&b.zones_serviced)
                .then_with(|| {
                    a.current_location
                        .manhattan_distance(&center)
                        .cmp(&b.current_location.manhattan_distance(&center))
                })
                .then_with(|| a.drone_id.cmp(&b.drone_id))
        });

        candidates.into_iter().next()
    }

    /// Spec §4.4: when a unit goes idle after finishing a mission, look for
    /// the best understaffed active fire to send it to next.
    pub async fn find_assignment_for_idle(&self, drone_id: &str) {
        let Some(unit) = self.units.get(drone_id) else {
            return;
        };
        if !unit.is_available() {
            return;
        }

        let mut scored: Vec<(u32, Severity)> = self
            .state
            .active_zone_ids()
            .into_iter()
            .filter_map(|zone_id| {
                let required = self.state.required(zone_id);
                let assigned = self.state.assigned(zone_id);
                if required == 0 || assigned >= required {
                    return None;
                }
                let zone = self.zones.get_or_create(zone_id);
                Some((zone_id, zone.severity))
            })
            .collect();

        if scored.is_empty() {
            return;
        }

        scored.sort_by(|(a_id, a_sev), (b_id, b_sev)| {
            let ratio = |zone_id: u32| -> f64 {
                let required = self.state.required(zone_id);
                if required == 0 {
                    1.0
                } else {
                    f64::from(self.state.assigned(zone_id)) / f64::from(required)
                }
            };
            b_sev
                .weight()
                .cmp(&a_sev.weight())
                .then_with(|| {
                    ratio(*a_id)
                        .partial_cmp(&ratio(*b_id))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a_id.cmp(b_id))
        });

        let (zone_id, severity) = scored[0];
        let event = FireEvent::new(unit.last_update_time.clone(), zone_id, severity);
        match self.send_assignment(drone_id, &event).await {
            Ok(()) => {
                self.mark_unit_tasked(drone_id, &event);
                self.state.increment_assigned(zone_id);
                if self.state.assigned(zone_id) >= self.state.required(zone_id) {
                    self.state.mark_fully_assigned(zone_id);
                }
            }
            Err(e) => warn!(%drone_id, error = %e, "idle follow-up assignment failed"),
        }
    }

    /// Optimistically records a sent assignment in the unit registry so a
    /// second dispatch decision made before the unit's own telemetry catches
    /// up still sees it as unavailable (invariant I4).
    fn mark_unit_tasked(&self, drone_id: &str, event: &FireEvent) {
        let event = event.clone();
        self.units.mutate(drone_id, |unit| {
            unit.current_task = Some(event);
            unit.state = UnitState::EnRoute;
        });
    }

    /// Spec §4.4 reconcileActiveFires step 1: the snapshot of active zones is
    /// ordered by severity weight (descending), ties broken by how
    /// understaffed a zone still is (ascending assigned/required ratio, so
    /// the least-served zone of a given severity goes first), then by zone
    /// id for determinism.
    fn priority_ordered_active_zone_ids(&self) -> Vec<u32> {
        let mut zone_ids = self.state.active_zone_ids();
        zone_ids.sort_by(|a, b| {
            let zone_a = self.zones.get_or_create(*a);
            let zone_b = self.zones.get_or_create(*b);
            let ratio = |zone_id: u32| -> f64 {
                let required = self.state.required(zone_id);
                if required == 0 {
                    1.0
                } else {
                    f64::from(self.state.assigned(zone_id)) / f64::from(required)
                }
            };
            zone_b
                .severity
                .weight()
                .cmp(&zone_a.severity.weight())
                .then_with(|| ratio(*a).partial_cmp(&ratio(*b)).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.cmp(b))
        });
        zone_ids
    }

    /// Spec §4.4: periodically re-checks every active fire, clamps required
    /// counts, and tries to fill any remaining deficit, redirecting
    /// lower-priority units if no idle unit is available.
    pub async fn reconcile_active_fires(&self) {
        let zone_ids = self.priority_ordered_active_zone_ids();

        for zone_id in zone_ids {
            let zone = self.zones.get_or_create(zone_id);
            if !zone.has_fire {
                self.state.erase_zone(zone_id);
                self.queue.purge_zone(zone_id);
                continue;
            }

            self.state
                .clamp_required(zone_id, zone.severity.units_required());
            let assigned_now = self.units.count_assigned_to_zone(zone_id);
            self.state.set_assigned(zone_id, assigned_now);

            let required = self.state.required(zone_id);
            if assigned_now >= required {
                self.state.mark_fully_assigned(zone_id);
                continue;
            }

            let deficit = required - assigned_now;
            let event = FireEvent::new(String::new(), zone_id, zone.severity);
            self.dispatch(event).await;

            let still_deficit = self.state.required(zone_id).saturating_sub(self.state.assigned(zone_id));
            if still_deficit > 0 {
                self.redirect_lower_priority_units(zone_id, zone.severity, still_deficit)
                    .await;
            }
        }
    }

    /// Pulls en-route units off a strictly lower-severity fire to cover a
    /// deficit on a higher-priority one, when no idle unit was available.
    async fn redirect_lower_priority_units(&self, zone_id: u32, severity: Severity, deficit: u32) {
        let zone = self.zones.get_or_create(zone_id);
        let center = zone.center();

        let mut candidates: Vec<UnitStatus> = self
            .units
            .all()
            .into_iter()
            .filter(|u| {
                u.state == drone_domain::UnitState::EnRoute
                    && u.current_task
                        .as_ref()
                        .is_some_and(|t| t.severity.weight() < severity.weight())
            })
            .collect();

        candidates.sort_by_key(|u| u.current_location.manhattan_distance(&center));

        let mut remaining = deficit;
        for candidate in candidates.into_iter().take(deficit as usize) {
            if remaining == 0 {
                break;
            }
            let Some(old_task) = candidate.current_task.clone() else {
                continue;
            };
            let event = FireEvent::new(String::new(), zone_id, severity);
            if self.send_assignment(&candidate.drone_id, &event).await.is_ok() {
                self.mark_unit_tasked(&candidate.drone_id, &event);
                self.state.decrement_assigned(old_task.zone_id);
                self.state.increment_assigned(zone_id);
                self.state.unmark_fully_assigned(old_task.zone_id);
                remaining -= 1;
                info!(
                    drone_id = %candidate.drone_id,
                    from_zone = old_task.zone_id,
                    to_zone = zone_id,
                    "redirected unit to higher-priority fire"
                );
            }
        }

        if self.state.assigned(zone_id) >= self.state.required(zone_id) {
            self.state.mark_fully_assigned(zone_id);
        }
    }

    async fn send_assignment(&self, drone_id: &str, event: &FireEvent) -> CoordinatorResult<()> {
        let addr = drone_addr(drone_id)
            .ok_or_else(|| CoordinatorError::UnknownDroneAddress(drone_id.to_string()))?;
        let wire = drone_protocol::encode_fire_event(event);
        self.transport
            .send_to(&wire, addr)
            .await
            .map_err(CoordinatorError::Send)?;
        debug!(%drone_id, zone_id = event.zone_id, "sent assignment");
        Ok(())
    }
}

/// Derives a unit's receive address from its drone id (`"drone7"` -> port
/// 7701), spec §4.5.
fn drone_addr(drone_id: &str) -> Option<SocketAddr> {
    let n: u32 = drone_id.strip_prefix("drone")?.parse().ok()?;
    let port = unit_receive_port(n);
    Some(SocketAddr::from(([127, 0, 0, 1], port)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drone_addr_derives_the_receive_port() {
        let addr = drone_addr("drone7").unwrap();
        assert_eq!(addr.port(), 7701);
    }

    #[test]
    fn drone_addr_rejects_malformed_ids() {
        assert!(drone_addr("unit7").is_none());
        assert!(drone_addr("dronex").is_none());
    }
}
