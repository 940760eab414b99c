//! Lot domain module.
//!
//! This crate contains the canonical Lot entity, its status state machine and
//! append-only audit trail, and the registry that owns all lot records. It is
//! pure domain logic (no IO, no HTTP, no storage).

pub mod event;
pub mod lot;
pub mod registry;

pub use event::{LotEvent, LotEventKind};
pub use lot::{Lot, LotKind, LotProperty, LotStatus, NewLot};
pub use registry::LotRegistry;
