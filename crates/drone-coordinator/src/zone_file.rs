//! Zone definitions file parser, spec §6: `<id> <x1> <y1> <x2> <y2>` per
//! line. Falls back to the default grid when the file is absent, empty, or
//! unreadable.

use drone_domain::grid::default_zone_grid;
use drone_domain::Zone;
use std::path::Path;
use tracing::warn;

#[must_use]
pub fn load_zones(path: Option<&str>) -> Vec<Zone> {
    let Some(path) = path else {
        return default_zone_grid();
    };

    let Ok(contents) = std::fs::read_to_string(Path::new(path)) else {
        warn!(%path, "zone file unreadable, falling back to default grid");
        return default_zone_grid();
    };

    let zones: Vec<Zone> = contents.lines().filter_map(parse_line).collect();

    if zones.is_empty() {
        warn!(%path, "zone file contained no valid lines, falling back to default grid");
        default_zone_grid()
    } else {
        zones
    }
}

fn parse_line(line: &str) -> Option<Zone> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        warn!(%line, "skipping malformed zone line");
        return None;
    }

    let id = fields[0].parse().ok()?;
    let x1 = fields[1].parse().ok()?;
    let y1 = fields[2].parse().ok()?;
    let x2 = fields[3].parse().ok()?;
    let y2 = fields[4].parse().ok()?;

    Some(Zone::new(id, x1, y1, x2, y2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_falls_back_to_default_grid() {
        let zones = load_zones(None);
        assert_eq!(zones.len(), default_zone_grid().len());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        assert!(parse_line("not a zone line").is_none());
        assert!(parse_line("# a comment").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("1 0 0 10 10").is_some());
    }
}
