//! Lot genealogy: directed parent → child transformation edges.

pub mod graph;

pub use graph::{GenealogyGraph, LotLink, LotLinkKind};
