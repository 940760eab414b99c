//! The Lot entity and its status state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tracelot_core::{BusinessRefs, Entity, LedgerError, LedgerResult, LotId};

use crate::event::{LotEvent, LotEventKind};

/// Lot material kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LotKind {
    RawMaterial,
    WorkInProgress,
    FinishedGood,
}

/// Lot status lifecycle.
///
/// `Consumed` and `Closed` are terminal: the record is retained for audit but
/// no further transition or movement is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Available,
    InProcess,
    Quarantine,
    Blocked,
    Consumed,
    Closed,
}

impl LotStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LotStatus::Consumed | LotStatus::Closed)
    }

    /// Statuses under which movements, splits and merges are rejected.
    pub fn blocks_movement(self) -> bool {
        matches!(self, LotStatus::Blocked | LotStatus::Quarantine)
    }
}

/// Free-form key/value/unit attribute attached at lot creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotProperty {
    pub key: String,
    pub value: String,
    pub unit: Option<String>,
}

/// Command: create a lot record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLot {
    /// Unique business key; immutable after creation.
    pub code: String,
    pub kind: LotKind,
    pub item_code: String,
    pub description: String,
    pub qty: Decimal,
    pub unit: String,
    pub location: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub supplier: Option<String>,
    pub batch_ref: Option<String>,
    pub properties: Vec<LotProperty>,
    pub actor: String,
}

impl NewLot {
    /// Minimal constructor; optional attributes default to absent.
    pub fn new(
        code: impl Into<String>,
        kind: LotKind,
        item_code: impl Into<String>,
        qty: Decimal,
        unit: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            kind,
            item_code: item_code.into(),
            description: String::new(),
            qty,
            unit: unit.into(),
            location: None,
            expires_at: None,
            supplier: None,
            batch_ref: None,
            properties: Vec::new(),
            actor: actor.into(),
        }
    }
}

/// A quantity of material tracked as one unit, with status and history.
///
/// Invariants:
/// - `qty >= 0` at all times.
/// - `events` only grows, newest-first.
/// - status changes only through the defined transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    id: LotId,
    code: String,
    kind: LotKind,
    item_code: String,
    description: String,
    qty: Decimal,
    unit: String,
    status: LotStatus,
    location: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    supplier: Option<String>,
    batch_ref: Option<String>,
    properties: Vec<LotProperty>,
    events: Vec<LotEvent>,
}

impl Entity for Lot {
    type Id = LotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Lot {
    /// Build a lot from a creation command, seeded with a `Created` event.
    pub fn create(spec: NewLot) -> LedgerResult<Self> {
        if spec.code.trim().is_empty() {
            return Err(LedgerError::validation("lot code cannot be empty"));
        }
        if spec.unit.trim().is_empty() {
            return Err(LedgerError::validation("unit of measure cannot be empty"));
        }
        if spec.qty < Decimal::ZERO {
            return Err(LedgerError::invalid_quantity(format!(
                "initial quantity cannot be negative (got {})",
                spec.qty
            )));
        }

        let mut lot = Self {
            id: LotId::new(),
            code: spec.code,
            kind: spec.kind,
            item_code: spec.item_code,
            description: spec.description,
            qty: spec.qty,
            unit: spec.unit,
            status: LotStatus::Available,
            location: spec.location,
            created_at: Utc::now(),
            expires_at: spec.expires_at,
            supplier: spec.supplier,
            batch_ref: spec.batch_ref,
            properties: spec.properties,
            events: Vec::new(),
        };
        lot.push_event(LotEvent::new(LotEventKind::Created, spec.actor, None));
        Ok(lot)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> LotKind {
        self.kind
    }

    pub fn item_code(&self) -> &str {
        &self.item_code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn qty(&self) -> Decimal {
        self.qty
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn status(&self) -> LotStatus {
        self.status
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }

    pub fn batch_ref(&self) -> Option<&str> {
        self.batch_ref.as_deref()
    }

    pub fn properties(&self) -> &[LotProperty] {
        &self.properties
    }

    /// Audit trail, newest-first.
    pub fn events(&self) -> &[LotEvent] {
        &self.events
    }

    /// Guard shared by movements, splits and merges: blocked or quarantined
    /// lots accept no transformation.
    pub fn ensure_movable(&self) -> LedgerResult<()> {
        if self.status.blocks_movement() {
            return Err(LedgerError::invalid_state(format!(
                "lot {} is {:?} and cannot be moved or transformed",
                self.code, self.status
            )));
        }
        Ok(())
    }

    fn ensure_not_terminal(&self) -> LedgerResult<()> {
        if self.status.is_terminal() {
            return Err(LedgerError::invalid_state(format!(
                "lot {} is in terminal status {:?}",
                self.code, self.status
            )));
        }
        Ok(())
    }

    /// Any non-terminal status → `Quarantine`.
    pub fn quarantine(&mut self, actor: &str) -> LedgerResult<()> {
        self.ensure_not_terminal()?;
        self.status = LotStatus::Quarantine;
        self.push_event(LotEvent::new(LotEventKind::Quarantined, actor, None));
        Ok(())
    }

    /// `Quarantine` → `Available`.
    pub fn release(&mut self, actor: &str) -> LedgerResult<()> {
        if self.status != LotStatus::Quarantine {
            return Err(LedgerError::invalid_state(format!(
                "lot {} is {:?}, only quarantined lots can be released",
                self.code, self.status
            )));
        }
        self.status = LotStatus::Available;
        self.push_event(LotEvent::new(LotEventKind::Released, actor, None));
        Ok(())
    }

    /// Any non-terminal status → `Blocked`. No transition out is defined.
    pub fn block(&mut self, reason: impl Into<String>, actor: &str) -> LedgerResult<()> {
        self.ensure_not_terminal()?;
        self.status = LotStatus::Blocked;
        self.push_event(LotEvent::new(
            LotEventKind::Blocked {
                reason: reason.into(),
            },
            actor,
            None,
        ));
        Ok(())
    }

    /// Append a `Note` event; no status or quantity effect.
    pub fn add_note(&mut self, text: impl Into<String>, actor: &str) {
        self.push_event(LotEvent::new(
            LotEventKind::Note { text: text.into() },
            actor,
            None,
        ));
    }

    /// Set the location, recording the prior one. Quantity is unaffected.
    ///
    /// Returns the prior location for the movement record.
    pub fn move_to(
        &mut self,
        to: impl Into<String>,
        actor: &str,
        note: Option<String>,
    ) -> Option<String> {
        let to = to.into();
        let from = self.location.replace(to.clone());
        self.push_event(LotEvent::new(
            LotEventKind::Moved {
                from: from.clone(),
                to,
            },
            actor,
            note,
        ));
        from
    }

    /// Subtract a consumed quantity; reaching zero flips to `Consumed`.
    pub fn consume(
        &mut self,
        qty: Decimal,
        refs: BusinessRefs,
        actor: &str,
        note: Option<String>,
    ) -> LedgerResult<()> {
        self.take_qty(qty, "consume")?;
        let unit = self.unit.clone();
        self.push_event(LotEvent::new(
            LotEventKind::Consumed { qty, unit, refs },
            actor,
            note,
        ));
        if self.qty == Decimal::ZERO {
            self.status = LotStatus::Consumed;
        }
        Ok(())
    }

    /// Subtract a scrapped quantity; reaching zero flips to `Closed`.
    pub fn scrap(
        &mut self,
        qty: Decimal,
        reason: Option<String>,
        actor: &str,
    ) -> LedgerResult<()> {
        self.take_qty(qty, "scrap")?;
        let text = match &reason {
            Some(r) => format!("scrapped {} {}: {}", qty, self.unit, r),
            None => format!("scrapped {} {}", qty, self.unit),
        };
        self.push_event(LotEvent::new(LotEventKind::Note { text }, actor, None));
        if self.qty == Decimal::ZERO {
            self.status = LotStatus::Closed;
        }
        Ok(())
    }

    /// Apply a signed correction; the resulting balance must stay non-negative.
    pub fn adjust(
        &mut self,
        delta: Decimal,
        reason: Option<String>,
        actor: &str,
    ) -> LedgerResult<()> {
        if delta == Decimal::ZERO {
            return Err(LedgerError::validation("adjustment delta cannot be zero"));
        }
        let new_qty = self.qty + delta;
        if new_qty < Decimal::ZERO {
            return Err(LedgerError::invalid_quantity(format!(
                "adjustment of {} would drive lot {} below zero (current {})",
                delta, self.code, self.qty
            )));
        }
        self.qty = new_qty;
        let text = match &reason {
            Some(r) => format!("adjusted by {} {}: {}", delta, self.unit, r),
            None => format!("adjusted by {} {}", delta, self.unit),
        };
        self.push_event(LotEvent::new(LotEventKind::Note { text }, actor, None));
        Ok(())
    }

    /// Subtract the total split out to child lots.
    pub fn split_out(
        &mut self,
        total: Decimal,
        actor: &str,
        note: Option<String>,
    ) -> LedgerResult<()> {
        if total <= Decimal::ZERO {
            return Err(LedgerError::validation(format!(
                "split total must be positive (got {total})"
            )));
        }
        if total > self.qty {
            return Err(LedgerError::validation(format!(
                "split total {} exceeds lot {} quantity {}",
                total, self.code, self.qty
            )));
        }
        self.qty -= total;
        let unit = self.unit.clone();
        self.push_event(LotEvent::new(
            LotEventKind::Split { total, unit },
            actor,
            note,
        ));
        Ok(())
    }

    /// Subtract a quantity contributed to a merge child.
    pub fn merge_contribute(
        &mut self,
        qty: Decimal,
        actor: &str,
        note: Option<String>,
    ) -> LedgerResult<()> {
        if qty <= Decimal::ZERO {
            return Err(LedgerError::invalid_quantity(format!(
                "merge contribution must be positive (got {qty})"
            )));
        }
        if qty > self.qty {
            return Err(LedgerError::invalid_quantity(format!(
                "merge contribution {} exceeds lot {} quantity {}",
                qty, self.code, self.qty
            )));
        }
        self.qty -= qty;
        let unit = self.unit.clone();
        self.push_event(LotEvent::new(LotEventKind::Merged { qty, unit }, actor, note));
        Ok(())
    }

    /// Add the total received from merged parents.
    pub fn merge_receive(&mut self, qty: Decimal, actor: &str, note: Option<String>) {
        self.qty += qty;
        let unit = self.unit.clone();
        self.push_event(LotEvent::new(LotEventKind::Merged { qty, unit }, actor, note));
    }

    fn take_qty(&mut self, qty: Decimal, op: &str) -> LedgerResult<()> {
        if qty <= Decimal::ZERO {
            return Err(LedgerError::invalid_quantity(format!(
                "{op} quantity must be positive (got {qty})"
            )));
        }
        if qty > self.qty {
            return Err(LedgerError::invalid_quantity(format!(
                "cannot {op} {} from lot {} holding {}",
                qty, self.code, self.qty
            )));
        }
        self.qty -= qty;
        Ok(())
    }

    // Newest-first: the audit trail is read back most recent entry first.
    fn push_event(&mut self, event: LotEvent) {
        self.events.insert(0, event);
    }
}
