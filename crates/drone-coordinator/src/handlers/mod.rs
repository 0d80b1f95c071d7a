//! Datagram handlers: telemetry updates and incoming fire events.

mod event_ingest_handler;
mod telemetry_handler;

pub use event_ingest_handler::handle_fire_event;
pub use telemetry_handler::handle_telemetry;
