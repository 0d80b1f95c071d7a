//! Fixed port assignments, spec §4.5 / §6. All peers are on localhost.

/// Coordinator's outbound (dispatch) port.
pub const COORDINATOR_SEND_PORT: u16 = 6000;
/// Coordinator's inbound (telemetry/event) port.
pub const COORDINATOR_RECEIVE_PORT: u16 = 6001;

/// Ingestion CLI's outbound port.
pub const INGEST_SEND_PORT: u16 = 5000;
/// Ingestion CLI's inbound port (reserved; ingestion does not currently
/// expect replies from the coordinator).
pub const INGEST_RECEIVE_PORT: u16 = 5001;

/// A unit's outbound (telemetry) port: `7000 + 100*n`.
#[must_use]
pub const fn unit_send_port(n: u32) -> u16 {
    (7000 + 100 * n) as u16
}

/// A unit's inbound (assignment) port: `7001 + 100*n`.
#[must_use]
pub const fn unit_receive_port(n: u32) -> u16 {
    (7001 + 100 * n) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_ports_derive_from_drone_number() {
        assert_eq!(unit_send_port(7), 7700);
        assert_eq!(unit_receive_port(7), 7701);
    }
}
