//! Unit-level errors, spec §4.3/§4.5.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("zone-info request for zone {zone_id} went unanswered after {attempts} attempts")]
    ZoneInfoUnanswered { zone_id: u32, attempts: u32 },

    #[error("failed to bind unit transport on send port {send_port}/receive port {receive_port}")]
    Bind {
        send_port: u16,
        receive_port: u16,
        #[source]
        source: std::io::Error,
    },
}
