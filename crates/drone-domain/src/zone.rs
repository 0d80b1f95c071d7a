//! Rectangular zones keyed by integer id, §3.

use crate::location::Location;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangular region, inclusive on all edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: u32,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    pub has_fire: bool,
    pub severity: Severity,
}

impl Zone {
    /// Builds a zone from an explicit rectangle; `x1 <= x2` and `y1 <= y2`
    /// are the caller's responsibility (file-loaded zones are validated at
    /// the parsing boundary).
    #[must_use]
    pub fn new(id: u32, x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self {
            id,
            x1,
            y1,
            x2,
            y2,
            has_fire: false,
            severity: Severity::None,
        }
    }

    /// A single-point zone wrapped in a +/-5 bounding box.
    #[must_use]
    pub fn from_point(id: u32, x: i64, y: i64) -> Self {
        Self::new(id, x - 5, y - 5, x + 5, y + 5)
    }

    #[must_use]
    pub const fn center(&self) -> Location {
        Location::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    #[must_use]
    pub fn contains(&self, loc: &Location) -> bool {
        loc.x >= self.x1 && loc.x <= self.x2 && loc.y >= self.y1 && loc.y <= self.y2
    }

    /// Shared edges count as overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Zone) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    pub fn set_fire_status(&mut self, has_fire: bool, severity: Severity) {
        self.has_fire = has_fire;
        self.severity = severity;
    }
}
