//! Background loops the coordinator binary spawns: the inbound datagram
//! reader, the dispatch-queue drainer, a bounded idle-reassignment worker
//! pool, and the cleanup/proactive-reconciliation timers, spec §4.4/§5.

use crate::handlers::{handle_fire_event, handle_telemetry};
use crate::state::AppState;
use drone_protocol::{decode_fire_event, decode_telemetry, decode_zone_info_request, encode_zone_info_response, is_telemetry_datagram, MAX_POLL_TIMEOUT};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Reads the inbound socket in a loop, classifying and routing each
/// datagram; exits once `running` is cleared.
pub async fn receive_loop(state: Arc<AppState>) {
    while state.running.load(Ordering::Relaxed) {
        let inbound = match state.transport.recv(MAX_POLL_TIMEOUT).await {
            Ok(Some(inbound)) => inbound,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "receive error");
                continue;
            }
        };

        let line = inbound.text.trim();

        if let Ok(zone_id) = decode_zone_info_request(line) {
            let zone = state.zones.get_or_create(zone_id);
            let wire = encode_zone_info_response(zone_id, zone.center());
            if let Err(e) = state.transport.send_to(&wire, inbound.sender).await {
                warn!(error = %e, "failed to answer zone-info request");
            }
            continue;
        }

        if is_telemetry_datagram(line) {
            match decode_telemetry(line) {
                Ok(telemetry) => {
                    handle_telemetry(
                        telemetry,
                        &state.zones,
                        &state.units,
                        &state.dispatch_state,
                        &state.queue,
                        &state.idle_followup_tx,
                    )
                    .await;
                }
                Err(e) => debug!(error = %e, %line, "malformed telemetry datagram"),
            }
            continue;
        }

        match decode_fire_event(line) {
            Ok(event) => handle_fire_event(event, &state.engine),
            Err(e) => debug!(error = %e, %line, "malformed fire-event datagram"),
        }
    }
}

/// Drains the priority queue, dispatching one event per iteration, then
/// reconciles every active fire regardless of whether an event was popped
/// (spec §4.4: reconciliation runs after each poll of the process loop, not
/// only from the periodic proactive timer).
pub async fn process_loop(state: Arc<AppState>) {
    while state.running.load(Ordering::Relaxed) {
        if state.queue.is_empty() {
            tokio::time::sleep(Duration::from_millis(50)).await;
        } else {
            state.engine.process_one().await;
        }
        state.engine.reconcile_active_fires().await;
    }
}

/// One of `idle_worker_pool_size` consumers draining idle-unit follow-up
/// requests, spec §5's bounded worker pool.
pub async fn idle_worker(state: Arc<AppState>) {
    while state.running.load(Ordering::Relaxed) {
        let next = {
            let mut rx = state.idle_followup_rx.lock().await;
            tokio::time::timeout(Duration::from_millis(200), rx.recv()).await
        };
        match next {
            Ok(Some(drone_id)) => state.engine.find_assignment_for_idle(&drone_id).await,
            Ok(None) => break,
            Err(_elapsed) => continue,
        }
    }
}

/// Purges bookkeeping and queued events for any zone whose fire has gone
/// out, spec §4.4.
pub async fn cleanup_timer(state: Arc<AppState>) {
    tokio::time::sleep(state.config.cleanup_initial_delay).await;
    let mut ticker = tokio::time::interval(state.config.cleanup_period);
    while state.running.load(Ordering::Relaxed) {
        ticker.tick().await;
        for zone_id in state.dispatch_state.active_zone_ids() {
            let zone = state.zones.get_or_create(zone_id);
            if !zone.has_fire {
                state.dispatch_state.erase_zone(zone_id);
                state.queue.purge_zone(zone_id);
            }
        }
    }
}

/// Periodically re-checks every active fire for unmet staffing, spec §4.4.
pub async fn proactive_timer(state: Arc<AppState>) {
    tokio::time::sleep(state.config.proactive_initial_delay).await;
    let mut ticker = tokio::time::interval(state.config.proactive_period);
    while state.running.load(Ordering::Relaxed) {
        ticker.tick().await;
        if state.queue.is_empty() {
            state.engine.reconcile_active_fires().await;
        }
    }
}

/// Signals every loop to stop and waits briefly for them to notice.
pub async fn shutdown(state: &Arc<AppState>) {
    state.running.store(false, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(250)).await;
}
