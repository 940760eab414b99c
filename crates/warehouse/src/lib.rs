//! Warehouse location reference data and the derived occupancy view.
//!
//! Occupancy is never stored: it is computed on demand by scanning the lot
//! and serial registries for matching location codes. This crate reads both
//! and mutates neither.

pub mod index;
pub mod location;

pub use index::{OccupancyLevel, WarehouseLocationIndex};
pub use location::WarehouseLocation;
