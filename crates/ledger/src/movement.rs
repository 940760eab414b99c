//! The movement ledger: an append-only record of what was done to lots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tracelot_core::{BusinessRefs, LedgerError, LedgerResult, MovementId};
use tracelot_lot::LotRegistry;

/// Movement operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Transfer,
    Consume,
    Adjust,
    Scrap,
    Produce,
    Return,
    Rework,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Transfer => "transfer",
            MovementKind::Consume => "consume",
            MovementKind::Adjust => "adjust",
            MovementKind::Scrap => "scrap",
            MovementKind::Produce => "produce",
            MovementKind::Return => "return",
            MovementKind::Rework => "rework",
        }
    }
}

/// Command: apply one movement to one lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementCommand {
    pub lot_code: String,
    pub kind: MovementKind,
    /// Signed only for `Adjust`; ignored (recorded as zero) for `Transfer`.
    pub qty: Decimal,
    /// Normalized to the lot's unit when omitted.
    pub unit: Option<String>,
    pub to_location: Option<String>,
    pub refs: BusinessRefs,
    pub actor: String,
    pub reason: Option<String>,
    pub note: Option<String>,
}

impl MovementCommand {
    fn bare(lot_code: impl Into<String>, kind: MovementKind, actor: impl Into<String>) -> Self {
        Self {
            lot_code: lot_code.into(),
            kind,
            qty: Decimal::ZERO,
            unit: None,
            to_location: None,
            refs: BusinessRefs::none(),
            actor: actor.into(),
            reason: None,
            note: None,
        }
    }

    pub fn transfer(
        lot_code: impl Into<String>,
        to_location: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            to_location: Some(to_location.into()),
            ..Self::bare(lot_code, MovementKind::Transfer, actor)
        }
    }

    pub fn consume(lot_code: impl Into<String>, qty: Decimal, actor: impl Into<String>) -> Self {
        Self {
            qty,
            ..Self::bare(lot_code, MovementKind::Consume, actor)
        }
    }

    pub fn adjust(lot_code: impl Into<String>, delta: Decimal, actor: impl Into<String>) -> Self {
        Self {
            qty: delta,
            ..Self::bare(lot_code, MovementKind::Adjust, actor)
        }
    }

    pub fn scrap(lot_code: impl Into<String>, qty: Decimal, actor: impl Into<String>) -> Self {
        Self {
            qty,
            ..Self::bare(lot_code, MovementKind::Scrap, actor)
        }
    }

    pub fn with_refs(mut self, refs: BusinessRefs) -> Self {
        self.refs = refs;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// One immutable ledger entry: the audit record of an applied movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub at: DateTime<Utc>,
    pub kind: MovementKind,
    pub lot_code: String,
    pub qty: Decimal,
    pub unit: String,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub refs: BusinessRefs,
    pub actor: String,
    pub reason: Option<String>,
    pub note: Option<String>,
}

/// Append-only, newest-first movement ledger.
///
/// Validate-then-mutate discipline: a rejected command appends nothing to the
/// ledger and leaves the lot untouched.
#[derive(Debug, Default)]
pub struct MovementLedger {
    entries: Vec<Movement>,
}

impl MovementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve, guard, mutate the lot, then append the audit record.
    pub fn apply(
        &mut self,
        lots: &mut LotRegistry,
        cmd: MovementCommand,
    ) -> LedgerResult<Movement> {
        let lot = lots.resolve_mut(&cmd.lot_code)?;
        lot.ensure_movable()?;

        let unit = cmd
            .unit
            .clone()
            .unwrap_or_else(|| lot.unit().to_string());

        let mut from_location = None;
        let mut recorded_qty = cmd.qty;

        match cmd.kind {
            MovementKind::Transfer => {
                let to = cmd
                    .to_location
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| {
                        LedgerError::validation("transfer requires a target location")
                    })?;
                from_location = lot.move_to(to, &cmd.actor, cmd.note.clone());
                recorded_qty = Decimal::ZERO;
            }
            MovementKind::Consume => {
                lot.consume(cmd.qty, cmd.refs.clone(), &cmd.actor, cmd.note.clone())?;
            }
            MovementKind::Adjust => {
                lot.adjust(cmd.qty, cmd.reason.clone(), &cmd.actor)?;
            }
            MovementKind::Scrap => {
                lot.scrap(cmd.qty, cmd.reason.clone(), &cmd.actor)?;
            }
            // Acknowledged extension points: these record a note and have no
            // quantity or location effect.
            MovementKind::Produce | MovementKind::Return | MovementKind::Rework => {
                lot.add_note(format!("{} movement recorded", cmd.kind.as_str()), &cmd.actor);
            }
        }

        let movement = Movement {
            id: MovementId::new(),
            at: Utc::now(),
            kind: cmd.kind,
            lot_code: cmd.lot_code,
            qty: recorded_qty,
            unit,
            from_location,
            to_location: cmd.to_location,
            refs: cmd.refs,
            actor: cmd.actor,
            reason: cmd.reason,
            note: cmd.note,
        };
        self.entries.insert(0, movement.clone());
        Ok(movement)
    }

    /// All entries, newest-first.
    pub fn entries(&self) -> &[Movement] {
        &self.entries
    }

    pub fn entries_for_lot<'a>(&'a self, lot_code: &str) -> Vec<&'a Movement> {
        self.entries
            .iter()
            .filter(|m| m.lot_code == lot_code)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tracelot_lot::{LotEventKind, LotKind, LotStatus, NewLot};

    fn setup(qty: Decimal) -> (LotRegistry, MovementLedger) {
        let mut lots = LotRegistry::new();
        lots.create(NewLot::new(
            "LOT-MP-0001",
            LotKind::RawMaterial,
            "MP-STEEL",
            qty,
            "kg",
            "tester",
        ))
        .unwrap();
        (lots, MovementLedger::new())
    }

    #[test]
    fn consume_reduces_stock_and_appends_entry() {
        let (mut lots, mut ledger) = setup(dec!(1200));

        let movement = ledger
            .apply(
                &mut lots,
                MovementCommand::consume("LOT-MP-0001", dec!(150), "op1")
                    .with_refs(BusinessRefs::for_order("WO-0001")),
            )
            .unwrap();

        let lot = lots.get("LOT-MP-0001").unwrap();
        assert_eq!(lot.qty(), dec!(1050));
        assert_eq!(lot.status(), LotStatus::Available);
        assert!(matches!(lot.events()[0].kind, LotEventKind::Consumed { .. }));

        assert_eq!(ledger.len(), 1);
        assert_eq!(movement.unit, "kg");
        assert_eq!(movement.refs.order_code.as_deref(), Some("WO-0001"));
    }

    #[test]
    fn consume_to_zero_flips_status_to_consumed() {
        let (mut lots, mut ledger) = setup(dec!(50));
        ledger
            .apply(&mut lots, MovementCommand::consume("LOT-MP-0001", dec!(50), "op1"))
            .unwrap();
        let lot = lots.get("LOT-MP-0001").unwrap();
        assert_eq!(lot.qty(), Decimal::ZERO);
        assert_eq!(lot.status(), LotStatus::Consumed);
    }

    #[test]
    fn transfer_moves_location_without_touching_qty() {
        let (mut lots, mut ledger) = setup(dec!(100));

        let first = ledger
            .apply(
                &mut lots,
                MovementCommand::transfer("LOT-MP-0001", "WH1-A-01", "op1"),
            )
            .unwrap();
        assert_eq!(first.from_location, None);
        assert_eq!(first.qty, Decimal::ZERO);

        let second = ledger
            .apply(
                &mut lots,
                MovementCommand::transfer("LOT-MP-0001", "WH1-B-02", "op1"),
            )
            .unwrap();
        assert_eq!(second.from_location.as_deref(), Some("WH1-A-01"));
        assert_eq!(second.to_location.as_deref(), Some("WH1-B-02"));

        let lot = lots.get("LOT-MP-0001").unwrap();
        assert_eq!(lot.location(), Some("WH1-B-02"));
        assert_eq!(lot.qty(), dec!(100));
    }

    #[test]
    fn transfer_without_target_is_rejected_without_side_effects() {
        let (mut lots, mut ledger) = setup(dec!(100));
        let mut cmd = MovementCommand::transfer("LOT-MP-0001", "", "op1");
        cmd.to_location = None;

        let err = ledger.apply(&mut lots, cmd).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger.is_empty());
        assert_eq!(lots.get("LOT-MP-0001").unwrap().location(), None);
    }

    #[test]
    fn movement_on_quarantined_lot_is_rejected_untouched() {
        let (mut lots, mut ledger) = setup(dec!(100));
        lots.quarantine("LOT-MP-0001", "qa1").unwrap();
        let events_before = lots.get("LOT-MP-0001").unwrap().events().len();

        let err = ledger
            .apply(
                &mut lots,
                MovementCommand::transfer("LOT-MP-0001", "WH1-A-01", "op1"),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)));

        let lot = lots.get("LOT-MP-0001").unwrap();
        assert_eq!(lot.location(), None);
        assert_eq!(lot.qty(), dec!(100));
        assert_eq!(lot.events().len(), events_before);
        assert!(ledger.is_empty());
    }

    #[test]
    fn movement_on_blocked_lot_is_rejected() {
        let (mut lots, mut ledger) = setup(dec!(100));
        lots.block("LOT-MP-0001", "failed inspection", "qa1").unwrap();

        let err = ledger
            .apply(&mut lots, MovementCommand::consume("LOT-MP-0001", dec!(10), "op1"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)));
        assert_eq!(lots.get("LOT-MP-0001").unwrap().qty(), dec!(100));
        assert!(ledger.is_empty());
    }

    #[test]
    fn unknown_lot_is_not_found() {
        let (mut lots, mut ledger) = setup(dec!(100));
        let err = ledger
            .apply(&mut lots, MovementCommand::consume("LOT-GHOST", dec!(1), "op1"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn over_consume_rejected_and_not_recorded() {
        let (mut lots, mut ledger) = setup(dec!(10));
        let err = ledger
            .apply(&mut lots, MovementCommand::consume("LOT-MP-0001", dec!(11), "op1"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity(_)));
        assert_eq!(lots.get("LOT-MP-0001").unwrap().qty(), dec!(10));
        assert!(ledger.is_empty());
    }

    #[test]
    fn scrap_to_zero_closes_lot() {
        let (mut lots, mut ledger) = setup(dec!(10));
        ledger
            .apply(
                &mut lots,
                MovementCommand::scrap("LOT-MP-0001", dec!(10), "qa1")
                    .with_reason("water damage"),
            )
            .unwrap();
        assert_eq!(lots.get("LOT-MP-0001").unwrap().status(), LotStatus::Closed);
    }

    #[test]
    fn adjust_applies_signed_delta() {
        let (mut lots, mut ledger) = setup(dec!(10));
        ledger
            .apply(
                &mut lots,
                MovementCommand::adjust("LOT-MP-0001", dec!(-3), "op1")
                    .with_reason("cycle count"),
            )
            .unwrap();
        assert_eq!(lots.get("LOT-MP-0001").unwrap().qty(), dec!(7));

        let err = ledger
            .apply(&mut lots, MovementCommand::adjust("LOT-MP-0001", dec!(-8), "op1"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity(_)));
        assert_eq!(lots.get("LOT-MP-0001").unwrap().qty(), dec!(7));
    }

    #[test]
    fn produce_records_note_only() {
        let (mut lots, mut ledger) = setup(dec!(10));
        let mut cmd = MovementCommand::bare("LOT-MP-0001", MovementKind::Produce, "op1");
        cmd.qty = dec!(5);

        ledger.apply(&mut lots, cmd).unwrap();
        let lot = lots.get("LOT-MP-0001").unwrap();
        // No quantity effect is defined for produce.
        assert_eq!(lot.qty(), dec!(10));
        assert!(matches!(lot.events()[0].kind, LotEventKind::Note { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn ledger_entries_are_newest_first() {
        let (mut lots, mut ledger) = setup(dec!(100));
        ledger
            .apply(&mut lots, MovementCommand::consume("LOT-MP-0001", dec!(10), "op1"))
            .unwrap();
        ledger
            .apply(
                &mut lots,
                MovementCommand::transfer("LOT-MP-0001", "WH1-A-01", "op1"),
            )
            .unwrap();

        assert_eq!(ledger.entries()[0].kind, MovementKind::Transfer);
        assert_eq!(ledger.entries()[1].kind, MovementKind::Consume);
        assert_eq!(ledger.entries_for_lot("LOT-MP-0001").len(), 2);
        assert!(ledger.entries_for_lot("LOT-OTHER").is_empty());
    }

    #[test]
    fn unit_normalizes_to_lot_unit_when_omitted() {
        let (mut lots, mut ledger) = setup(dec!(100));
        let movement = ledger
            .apply(&mut lots, MovementCommand::consume("LOT-MP-0001", dec!(1), "op1"))
            .unwrap();
        assert_eq!(movement.unit, "kg");

        let mut cmd = MovementCommand::consume("LOT-MP-0001", dec!(1), "op1");
        cmd.unit = Some("g".to_string());
        let movement = ledger.apply(&mut lots, cmd).unwrap();
        assert_eq!(movement.unit, "g");
    }
}
