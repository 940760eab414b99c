//! Merging multiple lots into one child lot, conserving total quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tracelot_core::{LedgerError, LedgerResult};
use tracelot_genealogy::{GenealogyGraph, LotLink, LotLinkKind};
use tracelot_lot::{Lot, LotKind, LotRegistry, NewLot};

/// One parent contribution to a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentSpec {
    pub code: String,
    pub qty: Decimal,
}

impl ParentSpec {
    pub fn new(code: impl Into<String>, qty: Decimal) -> Self {
        Self {
            code: code.into(),
            qty,
        }
    }
}

/// Attribute overrides used only when the child lot is created by the merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOverrides {
    pub kind: Option<LotKind>,
    pub item_code: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// Command: merge parent lots into a child lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeCommand {
    pub child_code: String,
    pub parents: Vec<ParentSpec>,
    pub actor: String,
    pub note: Option<String>,
    pub overrides: MergeOverrides,
}

/// Snapshot of the lots touched by a completed merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub child: Lot,
    pub parents: Vec<Lot>,
}

/// Merge parent lots into a child lot (resolved or created).
///
/// Hard contract: every parent is validated before any lot is mutated, so a
/// failure discovered while validating parent *k* leaves parents `1..k-1`
/// (and the child) unmodified.
///
/// Conservation: `Σ parent.qty_decrement == child.qty_increment`.
pub fn merge(
    lots: &mut LotRegistry,
    graph: &mut GenealogyGraph,
    cmd: MergeCommand,
) -> LedgerResult<MergeOutcome> {
    if cmd.child_code.trim().is_empty() {
        return Err(LedgerError::validation("child lot code cannot be empty"));
    }
    if cmd.parents.is_empty() {
        return Err(LedgerError::validation("merge requires at least one parent"));
    }

    // Validate-all before apply-all.
    let mut common_unit: Option<String> = None;
    for (i, spec) in cmd.parents.iter().enumerate() {
        if spec.code == cmd.child_code {
            return Err(LedgerError::validation(format!(
                "lot {} cannot be both parent and child of a merge",
                spec.code
            )));
        }
        if cmd.parents[..i].iter().any(|p| p.code == spec.code) {
            return Err(LedgerError::validation(format!(
                "duplicate parent {} in merge",
                spec.code
            )));
        }

        let parent = lots.resolve(&spec.code)?;
        parent.ensure_movable()?;
        if spec.qty <= Decimal::ZERO {
            return Err(LedgerError::invalid_quantity(format!(
                "contribution from {} must be positive (got {})",
                spec.code, spec.qty
            )));
        }
        if spec.qty > parent.qty() {
            return Err(LedgerError::invalid_quantity(format!(
                "contribution {} exceeds lot {} quantity {}",
                spec.qty,
                spec.code,
                parent.qty()
            )));
        }
        match &common_unit {
            None => common_unit = Some(parent.unit().to_string()),
            Some(unit) if unit != parent.unit() => {
                return Err(LedgerError::validation(format!(
                    "mixed units of measure in merge: {} vs {}",
                    unit,
                    parent.unit()
                )));
            }
            Some(_) => {}
        }
    }
    // Non-empty parents guarantee a unit was picked.
    let Some(unit) = common_unit else {
        return Err(LedgerError::validation("merge requires at least one parent"));
    };
    let total: Decimal = cmd.parents.iter().map(|p| p.qty).sum();

    // Resolve-or-create the child.
    if !lots.contains(&cmd.child_code) {
        let first_parent_item = lots.resolve(&cmd.parents[0].code)?.item_code().to_string();
        let child = Lot::create(NewLot {
            code: cmd.child_code.clone(),
            kind: cmd.overrides.kind.unwrap_or(LotKind::WorkInProgress),
            item_code: cmd
                .overrides
                .item_code
                .clone()
                .unwrap_or(first_parent_item),
            description: cmd.overrides.description.clone().unwrap_or_default(),
            qty: Decimal::ZERO,
            unit: unit.clone(),
            location: cmd.overrides.location.clone(),
            expires_at: None,
            supplier: None,
            batch_ref: None,
            properties: Vec::new(),
            actor: cmd.actor.clone(),
        })?;
        lots.insert(child)?;
    }

    // Apply: decrement each parent, link it, then credit the child once.
    let mut parents = Vec::with_capacity(cmd.parents.len());
    for spec in &cmd.parents {
        let parent = lots.resolve_mut(&spec.code)?;
        parent.merge_contribute(spec.qty, &cmd.actor, cmd.note.clone())?;
        parents.push(parent.clone());

        graph.add(LotLink::new(
            LotLinkKind::Merge,
            spec.code.clone(),
            cmd.child_code.clone(),
            Some(spec.qty),
            Some(unit.clone()),
            cmd.actor.clone(),
            cmd.note.clone(),
        ));
    }

    let child = lots.resolve_mut(&cmd.child_code)?;
    child.merge_receive(total, &cmd.actor, cmd.note.clone());

    Ok(MergeOutcome {
        child: child.clone(),
        parents,
    })
}
