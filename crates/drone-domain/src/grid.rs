//! Deterministic zone placement, §4.2 and §6.
//!
//! Two independent grids exist and are constructed so they never overlap:
//! the *default* 3x4 grid the coordinator installs when no zone file is
//! present (small, spacing 10, anchored at the origin), and the *implicit*
//! grid used to derive a center for any zone id the registry has never seen
//! (large offset, well clear of the default grid's footprint).

use crate::location::Location;
use crate::zone::Zone;

/// Columns in the default startup grid.
pub const DEFAULT_GRID_COLUMNS: u32 = 3;
/// Rows in the default startup grid.
pub const DEFAULT_GRID_ROWS: u32 = 4;
/// Spacing, in metres, between adjacent default-grid zone centers.
pub const DEFAULT_GRID_SPACING: i64 = 10;

/// Implicit-zone placement constants (`ΔX, ΔY, OX, OY` in spec §4.2),
/// chosen so no implicit zone's +/-5 bounding box can overlap a
/// default-grid zone's.
const IMPLICIT_DELTA_X: i64 = 500;
const IMPLICIT_DELTA_Y: i64 = 500;
const IMPLICIT_ORIGIN_X: i64 = 5000;
const IMPLICIT_ORIGIN_Y: i64 = 5000;

/// Builds the default 3x4 grid of single-point zones at spacing 10,
/// installed when the zone file is absent or empty.
#[must_use]
pub fn default_zone_grid() -> Vec<Zone> {
    let mut zones = Vec::with_capacity((DEFAULT_GRID_COLUMNS * DEFAULT_GRID_ROWS) as usize);
    for id in 1..=(DEFAULT_GRID_COLUMNS * DEFAULT_GRID_ROWS) {
        let (x, y) = default_grid_position(id);
        zones.push(Zone::from_point(id, x, y));
    }
    zones
}

fn default_grid_position(id: u32) -> (i64, i64) {
    let col = i64::from((id - 1) % DEFAULT_GRID_COLUMNS);
    let row = i64::from((id - 1) / DEFAULT_GRID_COLUMNS);
    (col * DEFAULT_GRID_SPACING, row * DEFAULT_GRID_SPACING)
}

/// Derives a deterministic center for a zone id the registry has never seen,
/// per the formula in spec §4.2.
#[must_use]
pub fn derive_implicit_center(id: u32) -> Location {
    let col = i64::from((id - 1) % DEFAULT_GRID_COLUMNS);
    let row = i64::from((id - 1) / DEFAULT_GRID_COLUMNS);
    Location::new(
        col * IMPLICIT_DELTA_X + IMPLICIT_ORIGIN_X,
        row * IMPLICIT_DELTA_Y + IMPLICIT_ORIGIN_Y,
    )
}

/// Builds a zone with a deterministically-derived center for an id absent
/// from the registry.
#[must_use]
pub fn derive_implicit_zone(id: u32) -> Zone {
    let center = derive_implicit_center(id);
    Zone::from_point(id, center.x, center.y)
}
