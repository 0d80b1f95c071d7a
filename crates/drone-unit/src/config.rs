//! Per-unit configuration derived from the drone's numeric id, spec §4.5.

use drone_protocol::ports::{unit_receive_port, unit_send_port};
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct UnitConfig {
    pub drone_id: String,
    pub drone_number: u32,
    pub send_port: u16,
    pub receive_port: u16,
    pub coordinator_addr: SocketAddr,
}

impl UnitConfig {
    #[must_use]
    pub fn new(drone_number: u32) -> Self {
        let coordinator_port =
            std::env::var("COORDINATOR_RECEIVE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(drone_protocol::ports::COORDINATOR_RECEIVE_PORT);

        Self {
            drone_id: format!("drone{drone_number}"),
            drone_number,
            send_port: unit_send_port(drone_number),
            receive_port: unit_receive_port(drone_number),
            coordinator_addr: SocketAddr::from(([127, 0, 0, 1], coordinator_port)),
        }
    }
}
