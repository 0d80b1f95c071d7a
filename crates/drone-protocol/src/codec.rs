//! Line-oriented ASCII wire codec, spec §4.1. Every datagram is one message,
//! fields are space-separated, and tagged tokens (`TASK:`, `FIRE_OUT:`, ...)
//! are position-independent within their suffix.

use crate::error::{ProtocolError, ProtocolResult};
use drone_domain::error_kind::is_error_kind_token;
use drone_domain::{ErrorKind, FireEvent, Location, Severity};

/// Encodes a `FireEvent` as `<time> <zoneId> <eventType> <severity>[
/// <errorKind>][ <droneId>...]`.
#[must_use]
pub fn encode_fire_event(event: &FireEvent) -> String {
    let mut out = format!(
        "{} {} {} {}",
        event.time, event.zone_id, event.event_type, event.severity
    );
    if event.error_kind != ErrorKind::None {
        out.push(' ');
        out.push_str(&event.error_kind.to_string());
    }
    for drone_id in &event.assigned_units {
        out.push(' ');
        out.push_str(drone_id);
    }
    out
}

/// Decodes a `FireEvent` literal. The first four tokens are mandatory; the
/// first later token matching `NONE|NOZZLE_JAM|DRONE_STUCK` sets the error
/// kind, all other trailing tokens are assigned unit ids in order.
pub fn decode_fire_event(line: &str) -> ProtocolResult<FireEvent> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(ProtocolError::TooShort {
            expected: 4,
            got: tokens.len(),
        });
    }

    let time = tokens[0].to_string();
    let zone_id = tokens[1]
        .parse::<u32>()
        .map_err(|_| ProtocolError::InvalidToken {
            field: "zoneId",
            token: tokens[1].to_string(),
        })?;
    let event_type = tokens[2].to_string();
    let severity =
        tokens[3]
            .parse::<Severity>()
            .map_err(|_| ProtocolError::InvalidToken {
                field: "severity",
                token: tokens[3].to_string(),
            })?;

    let mut error_kind = ErrorKind::None;
    let mut error_kind_seen = false;
    let mut assigned_units = Vec::new();

    for token in &tokens[4..] {
        if !error_kind_seen && is_error_kind_token(token) {
            error_kind = token.parse().expect("validated by is_error_kind_token");
            error_kind_seen = true;
        } else {
            assigned_units.push((*token).to_string());
        }
    }

    Ok(FireEvent {
        time,
        zone_id,
        event_type,
        severity,
        error_kind,
        assigned_units,
    })
}

/// A self-sufficient telemetry datagram, spec §4.1.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub drone_id: String,
    pub state_name: String,
    pub error: Option<ErrorKind>,
    pub task: Option<(u32, Severity)>,
    pub capacity_litres: Option<f64>,
    pub fire_out: Option<u32>,
    pub abandoned: Option<u32>,
    pub new_task: Option<u32>,
    pub location: Location,
}

impl Telemetry {
    #[must_use]
    pub fn new(drone_id: impl Into<String>, state_name: impl Into<String>, location: Location) -> Self {
        Self {
            drone_id: drone_id.into(),
            state_name: state_name.into(),
            error: None,
            task: None,
            capacity_litres: None,
            fire_out: None,
            abandoned: None,
            new_task: None,
            location,
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: ErrorKind) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn with_task(mut self, zone_id: u32, severity: Severity) -> Self {
        self.task = Some((zone_id, severity));
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, litres: f64) -> Self {
        self.capacity_litres = Some(litres);
        self
    }

    #[must_use]
    pub fn with_fire_out(mut self, zone_id: u32) -> Self {
        self.fire_out = Some(zone_id);
        self
    }

    #[must_use]
    pub fn with_abandoned(mut self, zone_id: u32) -> Self {
        self.abandoned = Some(zone_id);
        self
    }

    #[must_use]
    pub fn with_new_task(mut self, zone_id: u32) -> Self {
        self.new_task = Some(zone_id);
        self
    }
}

/// Classifier: a datagram is telemetry iff the first token starts with
/// `drone` and the last two tokens parse as integers.
#[must_use]
pub fn is_telemetry_datagram(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return false;
    }
    if !tokens[0].starts_with("drone") {
        return false;
    }
    let n = tokens.len();
    tokens[n - 2].parse::<i64>().is_ok() && tokens[n - 1].parse::<i64>().is_ok()
}

/// Encodes a `Telemetry` datagram.
#[must_use]
pub fn encode_telemetry(t: &Telemetry) -> String {
    let mut out = format!("{} {}", t.drone_id, t.state_name);
    if let Some(err) = t.error {
        out.push_str(&format!(" ERROR:{err}"));
    }
    if let Some((zone_id, severity)) = t.task {
        out.push_str(&format!(" TASK:{zone_id}:{severity}"));
    }
    if let Some(capacity) = t.capacity_litres {
        out.push_str(&format!(" CAPACITY:{capacity}"));
    }
    if let Some(zone_id) = t.fire_out {
        out.push_str(&format!(" FIRE_OUT:{zone_id}"));
    }
    if let Some(zone_id) = t.abandoned {
        out.push_str(&format!(" ABANDONED:{zone_id}"));
    }
    if let Some(zone_id) = t.new_task {
        out.push_str(&format!(" NEW_TASK:{zone_id}"));
    }
    out.push_str(&format!(" {} {}", t.location.x, t.location.y));
    out
}

/// Decodes a `Telemetry` datagram. Tagged tokens between the state name and
/// the trailing coordinates may appear in any order.
pub fn decode_telemetry(line: &str) -> ProtocolResult<Telemetry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(ProtocolError::TooShort {
            expected: 4,
            got: tokens.len(),
        });
    }

    let n = tokens.len();
    let x = tokens[n - 2]
        .parse::<i64>()
        .map_err(|_| ProtocolError::InvalidCoordinates(tokens[n - 2].to_string()))?;
    let y = tokens[n - 1]
        .parse::<i64>()
        .map_err(|_| ProtocolError::InvalidCoordinates(tokens[n - 1].to_string()))?;

    let drone_id = tokens[0].to_string();
    let state_name = tokens[1].to_string();

    let mut telemetry = Telemetry::new(drone_id, state_name, Location::new(x, y));

    for token in &tokens[2..n - 2] {
        if let Some(rest) = token.strip_prefix("ERROR:") {
            telemetry.error = rest.parse().ok();
        } else if let Some(rest) = token.strip_prefix("TASK:") {
            let mut parts = rest.splitn(2, ':');
            if let (Some(zone), Some(sev)) = (parts.next(), parts.next()) {
                if let (Ok(zone_id), Ok(severity)) = (zone.parse::<u32>(), sev.parse::<Severity>())
                {
                    telemetry.task = Some((zone_id, severity));
                }
            }
        } else if let Some(rest) = token.strip_prefix("CAPACITY:") {
            telemetry.capacity_litres = rest.parse().ok();
        } else if let Some(rest) = token.strip_prefix("FIRE_OUT:") {
            telemetry.fire_out = rest.parse().ok();
        } else if let Some(rest) = token.strip_prefix("ABANDONED:") {
            telemetry.abandoned = rest.parse().ok();
        } else if let Some(rest) = token.strip_prefix("NEW_TASK:") {
            telemetry.new_task = rest.parse().ok();
        }
    }

    Ok(telemetry)
}

/// A `ZONE_INFO_REQUEST:<zoneId>` datagram.
#[must_use]
pub fn encode_zone_info_request(zone_id: u32) -> String {
    format!("ZONE_INFO_REQUEST:{zone_id}")
}

pub fn decode_zone_info_request(line: &str) -> ProtocolResult<u32> {
    line.trim()
        .strip_prefix("ZONE_INFO_REQUEST:")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ProtocolError::InvalidToken {
            field: "zoneInfoRequest",
            token: line.to_string(),
        })
}

/// A `ZONE_INFO:<zoneId>:<cx>:<cy>` datagram.
#[must_use]
pub fn encode_zone_info_response(zone_id: u32, center: Location) -> String {
    format!("ZONE_INFO:{zone_id}:{}:{}", center.x, center.y)
}

pub fn decode_zone_info_response(line: &str) -> ProtocolResult<(u32, Location)> {
    let rest = line
        .trim()
        .strip_prefix("ZONE_INFO:")
        .ok_or_else(|| ProtocolError::InvalidToken {
            field: "zoneInfo",
            token: line.to_string(),
        })?;
    let parts: Vec<&str> = rest.split(':').collect();
    if parts.len() != 3 {
        return Err(ProtocolError::InvalidToken {
            field: "zoneInfo",
            token: line.to_string(),
        });
    }
    let zone_id = parts[0]
        .parse()
        .map_err(|_| ProtocolError::InvalidToken {
            field: "zoneInfo.zoneId",
            token: parts[0].to_string(),
        })?;
    let x = parts[1]
        .parse()
        .map_err(|_| ProtocolError::InvalidCoordinates(parts[1].to_string()))?;
    let y = parts[2]
        .parse()
        .map_err(|_| ProtocolError::InvalidCoordinates(parts[2].to_string()))?;
    Ok((zone_id, Location::new(x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_event_round_trips_through_the_wire() {
        let event = FireEvent::new("09:00:00", 4, Severity::High)
            .with_error_kind(ErrorKind::None)
            .with_assigned_units(vec!["drone1".into(), "drone2".into()]);
        let wire = encode_fire_event(&event);
        let decoded = decode_fire_event(&wire).unwrap();
        assert_eq!(decoded.time, event.time);
        assert_eq!(decoded.zone_id, event.zone_id);
        assert_eq!(decoded.severity, event.severity);
        assert_eq!(decoded.assigned_units, event.assigned_units);
    }

    #[test]
    fn fire_event_with_error_kind_separates_it_from_unit_ids() {
        let line = "09:00:01 2 FIRE High NOZZLE_JAM drone3 drone4";
        let decoded = decode_fire_event(line).unwrap();
        assert_eq!(decoded.error_kind, ErrorKind::NozzleJam);
        assert_eq!(decoded.assigned_units, vec!["drone3", "drone4"]);
    }

    #[test]
    fn telemetry_round_trips_with_all_tags_present() {
        let t = Telemetry::new("drone7", "EnRoute", Location::new(5, 5))
            .with_task(3, Severity::Moderate)
            .with_capacity(42.5)
            .with_new_task(3);
        let wire = encode_telemetry(&t);
        assert!(is_telemetry_datagram(&wire));
        let decoded = decode_telemetry(&wire).unwrap();
        assert_eq!(decoded, t);
    }

    #[test]
    fn telemetry_tags_are_position_independent() {
        let forward = "drone1 EnRoute TASK:2:Low CAPACITY:10 3 4";
        let reversed = "drone1 EnRoute CAPACITY:10 TASK:2:Low 3 4";
        assert_eq!(
            decode_telemetry(forward).unwrap(),
            decode_telemetry(reversed).unwrap()
        );
    }

    #[test]
    fn classifier_requires_drone_prefix_and_trailing_integers() {
        assert!(is_telemetry_datagram("drone1 Idle 0 0"));
        assert!(!is_telemetry_datagram("09:00:00 1 FIRE Low"));
        assert!(!is_telemetry_datagram("drone1 Idle x y"));
    }

    #[test]
    fn zone_info_round_trips() {
        let wire = encode_zone_info_response(4, Location::new(30, 40));
        let (zone_id, center) = decode_zone_info_response(&wire).unwrap();
        assert_eq!(zone_id, 4);
        assert_eq!(center, Location::new(30, 40));

        let req = encode_zone_info_request(4);
        assert_eq!(decode_zone_info_request(&req).unwrap(), 4);
    }
}
