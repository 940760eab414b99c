//! Movement ledger, split/merge engines, and the `TraceStore` facade.
//!
//! This crate orchestrates the multi-entity operations of the traceability
//! ledger: each command is resolved and validated in full before any lot is
//! mutated, then recorded in the append-only audit structures.

pub mod merge;
pub mod movement;
pub mod split;
pub mod store;

pub use merge::{MergeCommand, MergeOutcome, MergeOverrides, ParentSpec};
pub use movement::{Movement, MovementCommand, MovementKind, MovementLedger};
pub use split::{ChildSpec, SplitCommand, SplitOutcome};
pub use store::TraceStore;
