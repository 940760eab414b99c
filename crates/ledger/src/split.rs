//! Splitting one lot into multiple child lots, conserving total quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tracelot_core::{LedgerError, LedgerResult};
use tracelot_genealogy::{GenealogyGraph, LotLink, LotLinkKind};
use tracelot_lot::{Lot, LotKind, LotRegistry, NewLot};

/// Per-child specification; unset attributes are inherited from the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSpec {
    pub code: String,
    pub qty: Decimal,
    pub kind: Option<LotKind>,
    pub item_code: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl ChildSpec {
    pub fn new(code: impl Into<String>, qty: Decimal) -> Self {
        Self {
            code: code.into(),
            qty,
            kind: None,
            item_code: None,
            description: None,
            location: None,
        }
    }
}

/// Command: split a parent lot into child lots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitCommand {
    pub parent_code: String,
    pub children: Vec<ChildSpec>,
    pub actor: String,
    pub note: Option<String>,
}

/// Snapshot of the lots touched by a completed split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    pub parent: Lot,
    pub children: Vec<Lot>,
}

/// Split a parent lot into child lots.
///
/// Conservation: `parent.qty_before == parent.qty_after + Σ children.qty`.
/// All validation happens before the parent is touched, so a failure leaves
/// every lot and the graph unmodified.
pub fn split(
    lots: &mut LotRegistry,
    graph: &mut GenealogyGraph,
    cmd: SplitCommand,
) -> LedgerResult<SplitOutcome> {
    let parent = lots.resolve(&cmd.parent_code)?;
    parent.ensure_movable()?;

    if cmd.children.is_empty() {
        return Err(LedgerError::validation("split requires at least one child"));
    }
    for child in &cmd.children {
        if child.code.trim().is_empty() {
            return Err(LedgerError::validation("child lot code cannot be empty"));
        }
        if child.qty <= Decimal::ZERO {
            return Err(LedgerError::invalid_quantity(format!(
                "child {} quantity must be positive (got {})",
                child.code, child.qty
            )));
        }
        if lots.contains(&child.code) {
            return Err(LedgerError::conflict(format!(
                "lot code {} already exists",
                child.code
            )));
        }
    }
    for (i, child) in cmd.children.iter().enumerate() {
        if cmd.children[..i].iter().any(|c| c.code == child.code) {
            return Err(LedgerError::conflict(format!(
                "duplicate child code {} in split",
                child.code
            )));
        }
    }

    let total: Decimal = cmd.children.iter().map(|c| c.qty).sum();
    if total <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "split total must be positive (got {total})"
        )));
    }
    if total > parent.qty() {
        return Err(LedgerError::validation(format!(
            "split total {} exceeds parent {} quantity {}",
            total,
            parent.code(),
            parent.qty()
        )));
    }

    // Inherited defaults, captured before the mutable borrow.
    let parent_kind = parent.kind();
    let parent_item = parent.item_code().to_string();
    let parent_desc = parent.description().to_string();
    let parent_unit = parent.unit().to_string();
    let parent_location = parent.location().map(str::to_string);

    // Validation complete; mutate the parent first, then create children.
    lots.resolve_mut(&cmd.parent_code)?
        .split_out(total, &cmd.actor, cmd.note.clone())?;

    let mut children = Vec::with_capacity(cmd.children.len());
    for spec in cmd.children {
        let child = Lot::create(NewLot {
            code: spec.code.clone(),
            kind: spec.kind.unwrap_or(parent_kind),
            item_code: spec.item_code.unwrap_or_else(|| parent_item.clone()),
            description: spec.description.unwrap_or_else(|| parent_desc.clone()),
            qty: spec.qty,
            unit: parent_unit.clone(),
            location: spec.location.or_else(|| parent_location.clone()),
            expires_at: None,
            supplier: None,
            batch_ref: None,
            properties: Vec::new(),
            actor: cmd.actor.clone(),
        })?;
        lots.insert(child)?;

        graph.add(LotLink::new(
            LotLinkKind::Split,
            cmd.parent_code.clone(),
            spec.code.clone(),
            Some(spec.qty),
            Some(parent_unit.clone()),
            cmd.actor.clone(),
            cmd.note.clone(),
        ));

        let child = lots.resolve_mut(&spec.code)?;
        child.add_note(
            format!("created by split from lot {}", cmd.parent_code),
            &cmd.actor,
        );
        children.push(child.clone());
    }

    Ok(SplitOutcome {
        parent: lots.resolve(&cmd.parent_code)?.clone(),
        children,
    })
}
