//! Event file parser, spec §6: `<hh:mm:ss> <zoneId> <eventType> <severity>`
//! per line. A malformed line is skipped, not fatal.

use drone_domain::{FireEvent, Severity};
use tracing::warn;

#[must_use]
pub fn parse_events(contents: &str) -> Vec<FireEvent> {
    contents.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<FireEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        warn!(%line, "skipping malformed event line");
        return None;
    }

    let time = fields[0].to_string();
    let Ok(zone_id) = fields[1].parse::<u32>() else {
        warn!(%line, "skipping event line with invalid zone id");
        return None;
    };
    let event_type = fields[2].to_string();
    let Ok(severity) = fields[3].parse::<Severity>() else {
        warn!(%line, "skipping event line with invalid severity");
        return None;
    };

    let mut event = FireEvent::new(time, zone_id, severity);
    event.event_type = event_type;
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_lines() {
        let events = parse_events("09:00:00 1 FIRE Low\n09:00:05 2 FIRE High\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].zone_id, 1);
        assert_eq!(events[1].severity, Severity::High);
    }

    #[test]
    fn skips_malformed_and_blank_lines() {
        let events = parse_events("garbage\n\n# comment\n09:00:00 1 FIRE Low\n");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn skips_lines_with_unknown_severity() {
        let events = parse_events("09:00:00 1 FIRE Blazing\n");
        assert!(events.is_empty());
    }
}
