//! Concurrent registries the coordinator keeps in memory: zones and units.

mod unit_registry;
mod zone_registry;

pub use unit_registry::UnitRegistry;
pub use zone_registry::ZoneRegistry;
