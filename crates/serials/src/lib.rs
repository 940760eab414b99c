//! Serialized sub-units (box/pallet/roll) belonging to lots.
//!
//! Serials are a packaging/tracking projection of a lot, not a consuming
//! transformation: creating them never alters the owning lot's quantity.

pub mod registry;
pub mod serial;

pub use registry::{CreateSerials, SerialRegistry};
pub use serial::{ScanAction, SerialEvent, SerialEventKind, SerialStatus, SerialUnit, UnitType};
