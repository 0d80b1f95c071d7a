//! # Fire-Suppression Fleet — Wire Protocol
//!
//! The line-oriented ASCII codec (spec §4.1) and the UDP transport it rides
//! on (spec §4.5): fire events, telemetry, zone-info request/response, and
//! the fixed port layout every peer binds to.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod error;
pub mod ports;
pub mod transport;

pub use codec::{
    decode_fire_event, decode_telemetry, decode_zone_info_request, decode_zone_info_response,
    encode_fire_event, encode_telemetry, encode_zone_info_request, encode_zone_info_response,
    is_telemetry_datagram, Telemetry,
};
pub use error::{ProtocolError, ProtocolResult};
pub use transport::{Inbound, Transport, MAX_POLL_TIMEOUT};
