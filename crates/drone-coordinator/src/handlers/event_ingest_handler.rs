//! Routes an incoming fire-event datagram (from the ingestion CLI, or a
//! redirection/proactive event generated internally) into the dispatch
//! engine's queue.

use crate::dispatch::DispatchEngine;
use drone_domain::FireEvent;

pub fn handle_fire_event(event: FireEvent, engine: &DispatchEngine) {
    engine.ingest_fire_event(event);
}
