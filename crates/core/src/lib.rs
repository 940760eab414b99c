//! `tracelot-core` — shared primitives for the lot traceability ledger.
//!
//! This crate contains **pure domain** building blocks (no infrastructure
//! concerns): typed identifiers, the ledger error model, and the business
//! reference bundle carried on movements and genealogy edges.

pub mod entity;
pub mod error;
pub mod id;
pub mod refs;

pub use entity::Entity;
pub use error::{LedgerError, LedgerResult};
pub use id::{EventId, LocationId, LotId, LotLinkId, MovementId, SerialUnitId};
pub use refs::BusinessRefs;
