//! The unit mission state machine, spec §4.3: a single async task driving
//! one drone through `Idle -> EnRoute -> DroppingAgent -> ArrivedToBase ->
//! Idle`, with a `Fault` branch reachable from `EnRoute` or `DroppingAgent`.
//!
//! Implemented as a tagged enum with a closed transition table
//! (`UnitState::can_transition_to`) rather than per-state trait objects, per
//! the design note against dynamic dispatch for a small closed state set.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use drone_domain::{ErrorKind, FireEvent, Location, UnitSpec, UnitState};
use drone_protocol::{
    decode_fire_event, decode_zone_info_response, encode_zone_info_request, Telemetry, Transport,
    MAX_POLL_TIMEOUT,
};
use tracing::{info, warn};

use crate::error::UnitError;

/// Attempts made before giving up and holding the current position.
const ZONE_INFO_ATTEMPTS: u32 = 5;

/// A unit stuck in `EnRoute` past this duration reports a soft fault.
pub const MAX_MOVEMENT_TIME: Duration = Duration::from_secs(30);
/// A unit stuck in `DroppingAgent` past this duration reports a hard fault.
pub const MAX_DROP_AGENT_TIME: Duration = Duration::from_secs(15);
/// Telemetry cadence, comfortably above the 5 Hz floor.
const TELEMETRY_INTERVAL: Duration = Duration::from_millis(180);
/// Position/redirection poll cadence, comfortably above the 20 Hz floor and
/// within the 250 ms transport poll ceiling.
const TICK: Duration = Duration::from_millis(40);
/// Dwell time for refilling the tank at base.
const REFILL_TIME: Duration = Duration::from_secs(5);

enum TravelOutcome {
    Arrived,
    Redirected,
    Faulted,
}

pub struct UnitMission {
    drone_id: String,
    home: Location,
    spec: UnitSpec,
    location: Location,
    target: Location,
    state: UnitState,
    current_task: Option<FireEvent>,
    error_kind: ErrorKind,
    zones_serviced: u32,
    coordinator_addr: SocketAddr,
    transport: Arc<Transport>,
}

impl UnitMission {
    #[must_use]
    pub fn new(
        drone_id: impl Into<String>,
        home: Location,
        coordinator_addr: SocketAddr,
        transport: Arc<Transport>,
    ) -> Self {
        Self {
            drone_id: drone_id.into(),
            home,
            spec: UnitSpec::standard(),
            location: home,
            target: home,
            state: UnitState::Idle,
            current_task: None,
            error_kind: ErrorKind::None,
            zones_serviced: 0,
            coordinator_addr,
            transport,
        }
    }

    /// Drives the unit forever; the coordinator is the only thing that can
    /// meaningfully stop it, so this never returns in normal operation.
    pub async fn run(&mut self) -> ! {
        loop {
            match self.state {
                UnitState::Idle => self.idle_phase().await,
                UnitState::EnRoute => self.en_route_phase().await,
                UnitState::DroppingAgent => self.dropping_agent_phase().await,
                UnitState::ArrivedToBase => self.arrived_to_base_phase().await,
                UnitState::Fault => self.fault_phase().await,
            }
        }
    }

    async fn idle_phase(&mut self) {
        self.send_telemetry().await;
        let Some(text) = self.poll_inbound(TICK).await else {
            return;
        };
        let Ok(event) = decode_fire_event(&text) else {
            return;
        };
        self.start_mission(event).await;
    }

    /// Accepts a new task; if one was already in flight, this is a
    /// redirection and the coordinator is told which zone was abandoned.
    async fn start_mission(&mut self, event: FireEvent) {
        let target = self.zone_center(event.zone_id).await;
        let prior_zone = self.current_task.as_ref().map(|t| t.zone_id);

        self.target = target;
        let zone_id = event.zone_id;
        let severity = event.severity;
        self.current_task = Some(event);
        self.state = UnitState::EnRoute;

        let mut telemetry = self.base_telemetry().with_task(zone_id, severity);
        if let Some(prior) = prior_zone {
            telemetry = telemetry.with_abandoned(prior).with_new_task(zone_id);
            info!(drone_id = %self.drone_id, from_zone = prior, to_zone = zone_id, "redirected");
        }
        self.send(&telemetry).await;
    }

    async fn en_route_phase(&mut self) {
        match self.travel_to(self.target, true, true).await {
            TravelOutcome::Arrived => {
                if self.believes_zone_already_satisfied() {
                    info!(drone_id = %self.drone_id, "arrived to find the zone already satisfied, standing down");
                    self.current_task = None;
                    self.target = self.home;
                    self.state = UnitState::ArrivedToBase;
                } else {
                    self.state = UnitState::DroppingAgent;
                }
                self.send_telemetry().await;
            }
            TravelOutcome::Redirected | TravelOutcome::Faulted => {}
        }
    }

    /// On arrival, the unit's own belief (from the `assignedUnits` list it
    /// was dispatched with) about whether the zone is already fully staffed
    /// without it. Mirrors the belief used at drop-completion, spec §4.3
    /// step 3.
    fn believes_zone_already_satisfied(&self) -> bool {
        self.current_task
            .as_ref()
            .is_some_and(|t| t.assigned_units.len() as u32 >= t.severity.units_required())
    }

    async fn dropping_agent_phase(&mut self) {
        let Some(task) = self.current_task.clone() else {
            self.state = UnitState::ArrivedToBase;
            return;
        };

        let required_litres = task.severity.agent_litres_required();
        let duration = self.spec.firefighting_time(required_litres);
        let starting_capacity = self.spec.current_capacity;
        let started = Instant::now();
        let mut last_telemetry = started - TELEMETRY_INTERVAL;

        loop {
            if started.elapsed() >= MAX_DROP_AGENT_TIME {
                self.enter_fault(ErrorKind::NozzleJam).await;
                return;
            }
            let elapsed = started.elapsed();
            if elapsed >= duration {
                break;
            }

            let fraction = elapsed.as_secs_f64() / duration.as_secs_f64().max(f64::EPSILON);
            self.spec.current_capacity = (starting_capacity * (1.0 - fraction)).max(0.0);

            if last_telemetry.elapsed() >= TELEMETRY_INTERVAL {
                self.send_telemetry().await;
                last_telemetry = Instant::now();
            }
            tokio::time::sleep(TICK).await;
        }

        self.spec.current_capacity = 0.0;
        self.zones_serviced += 1;
        self.state = UnitState::ArrivedToBase;

        // Own estimate of whether this drop was the one that finished the
        // job: the assignment we accepted already listed every unit dispatched
        // ahead of us, so adding ourselves tells us whether the zone's
        // required headcount is now met.
        let believes_satisfied =
            task.assigned_units.len() as u32 + 1 >= task.severity.units_required();

        let mut telemetry = self.base_telemetry().with_capacity(0.0);
        if believes_satisfied {
            telemetry = telemetry.with_fire_out(task.zone_id);
        }
        self.send(&telemetry).await;

        self.current_task = None;
        self.target = self.home;
    }

    async fn arrived_to_base_phase(&mut self) {
        if self.location != self.home {
            if let TravelOutcome::Faulted = self.travel_to(self.home, false, false).await {
                return;
            }
        }

        tokio::time::sleep(REFILL_TIME).await;
        self.spec.current_capacity = self.spec.full_capacity;
        self.current_task = None;
        self.state = UnitState::Idle;
        self.send_telemetry().await;
    }

    async fn fault_phase(&mut self) {
        self.travel_to(self.home, false, false).await;
        self.state = UnitState::ArrivedToBase;
        if self.error_kind.is_soft_fault() {
            info!(drone_id = %self.drone_id, "soft fault cleared on arrival at base");
            self.error_kind = ErrorKind::None;
        }
        self.send_telemetry().await;
    }

    /// Travels in a straight Manhattan-interpolated line toward `destination`,
    /// sending position/state telemetry along the way. When `watch_for_redirect`
    /// is set, an inbound assignment for a different zone interrupts travel
    /// and starts a new mission. When `enforce_timeout` is set, exceeding
    /// `MAX_MOVEMENT_TIME` enters the soft-fault branch.
    async fn travel_to(
        &mut self,
        destination: Location,
        watch_for_redirect: bool,
        enforce_timeout: bool,
    ) -> TravelOutcome {
        let origin = self.location;
        let distance = origin.manhattan_distance(&destination) as f64;
        let travel_time = self.spec.travel_time(distance);
        let started = Instant::now();
        let mut last_telemetry = started - TELEMETRY_INTERVAL;

        loop {
            if enforce_timeout && started.elapsed() >= MAX_MOVEMENT_TIME {
                self.enter_fault(ErrorKind::DroneStuck).await;
                return TravelOutcome::Faulted;
            }

            let progress = if travel_time.is_zero() {
                1.0
            } else {
                (started.elapsed().as_secs_f64() / travel_time.as_secs_f64()).min(1.0)
            };
            self.location = interpolate(origin, destination, progress);

            if last_telemetry.elapsed() >= TELEMETRY_INTERVAL {
                self.send_telemetry().await;
                last_telemetry = Instant::now();
            }

            if progress >= 1.0 {
                self.location = destination;
                return TravelOutcome::Arrived;
            }

            if watch_for_redirect {
                if let Some(text) = self.poll_inbound(TICK).await {
                    if let Ok(event) = decode_fire_event(&text) {
                        if self.is_redirection(&event) {
                            self.start_mission(event).await;
                            return TravelOutcome::Redirected;
                        }
                    }
                }
            } else {
                tokio::time::sleep(TICK).await;
            }
        }
    }

    fn is_redirection(&self, event: &FireEvent) -> bool {
        self.current_task
            .as_ref()
            .is_some_and(|t| t.zone_id != event.zone_id)
    }

    async fn enter_fault(&mut self, kind: ErrorKind) {
        warn!(drone_id = %self.drone_id, ?kind, "entering fault");
        self.error_kind = kind;
        let abandoned_zone = self.current_task.take().map(|t| t.zone_id);
        self.state = UnitState::Fault;

        let mut telemetry = self.base_telemetry().with_error(kind);
        if let Some(zone_id) = abandoned_zone {
            telemetry = telemetry.with_abandoned(zone_id);
        }
        self.send(&telemetry).await;
    }

    async fn zone_center(&self, zone_id: u32) -> Location {
        match self.request_zone_center(zone_id).await {
            Ok(center) => center,
            Err(e) => {
                warn!(drone_id = %self.drone_id, zone_id, error = %e, "zone-info request unanswered, holding position");
                self.location
            }
        }
    }

    async fn request_zone_center(&self, zone_id: u32) -> Result<Location, UnitError> {
        let request = encode_zone_info_request(zone_id);
        for _ in 0..ZONE_INFO_ATTEMPTS {
            if self
                .transport
                .send_to(&request, self.coordinator_addr)
                .await
                .is_err()
            {
                continue;
            }
            if let Ok(Some(inbound)) = self.transport.recv(MAX_POLL_TIMEOUT).await {
                if let Ok((id, center)) = decode_zone_info_response(&inbound.text) {
                    if id == zone_id {
                        return Ok(center);
                    }
                }
            }
        }
        Err(UnitError::ZoneInfoUnanswered {
            zone_id,
            attempts: ZONE_INFO_ATTEMPTS,
        })
    }

    fn base_telemetry(&self) -> Telemetry {
        Telemetry::new(self.drone_id.clone(), self.state.to_string(), self.location)
    }

    async fn send_telemetry(&self) {
        self.send(&self.base_telemetry()).await;
    }

    async fn send(&self, telemetry: &Telemetry) {
        let wire = drone_protocol::encode_telemetry(telemetry);
        if let Err(e) = self.transport.send_to(&wire, self.coordinator_addr).await {
            warn!(drone_id = %self.drone_id, error = %e, "telemetry send failed");
        }
    }

    async fn poll_inbound(&self, deadline: Duration) -> Option<String> {
        match self.transport.recv(deadline).await {
            Ok(Some(inbound)) => Some(inbound.text),
            Ok(None) => None,
            Err(e) => {
                warn!(drone_id = %self.drone_id, error = %e, "receive error");
                None
            }
        }
    }
}

fn interpolate(from: Location, to: Location, progress: f64) -> Location {
    let progress = progress.clamp(0.0, 1.0);
    let x = from.x as f64 + (to.x - from.x) as f64 * progress;
    let y = from.y as f64 + (to.y - from.y) as f64 * progress;
    Location::new(x.round() as i64, y.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_reaches_the_endpoints_exactly() {
        let a = Location::new(0, 0);
        let b = Location::new(10, 20);
        assert_eq!(interpolate(a, b, 0.0), a);
        assert_eq!(interpolate(a, b, 1.0), b);
    }

    #[test]
    fn interpolate_clamps_out_of_range_progress() {
        let a = Location::new(0, 0);
        let b = Location::new(10, 0);
        assert_eq!(interpolate(a, b, 1.5), b);
        assert_eq!(interpolate(a, b, -0.5), a);
    }
}
