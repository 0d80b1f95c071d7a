//! Integer-coordinate points on the planar grid and the distance/segment
//! tests the dispatch and mission engines build on.

use serde::{Deserialize, Serialize};

/// A point in the abstract planar grid, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub x: i64,
    pub y: i64,
}

impl Location {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    #[must_use]
    pub fn manhattan_distance(&self, other: &Location) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// True if `self` lies on the axis-aligned segment from `a` to `b`.
    ///
    /// The segment must be horizontal or vertical (or a single point); a
    /// diagonal segment never has points "on" it under this test.
    #[must_use]
    pub fn is_on_segment(&self, a: &Location, b: &Location) -> bool {
        if a.x == b.x {
            self.x == a.x && between(self.y, a.y, b.y)
        } else if a.y == b.y {
            self.y == a.y && between(self.x, a.x, b.x)
        } else {
            false
        }
    }
}

fn between(v: i64, a: i64, b: i64) -> bool {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    v >= lo && v <= hi
}
