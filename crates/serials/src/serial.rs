//! The SerialUnit entity and its scan state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tracelot_core::{Entity, EventId, LedgerError, LedgerResult, SerialUnitId};

/// Physical packaging form of a serialized unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Piece,
    Box,
    Pallet,
    Container,
}

/// Serial status lifecycle, analogous to the lot state machine but without
/// terminal states (serials are packaging records, not stock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialStatus {
    Available,
    Quarantine,
    Blocked,
}

impl SerialStatus {
    pub fn blocks_movement(self) -> bool {
        matches!(self, SerialStatus::Blocked | SerialStatus::Quarantine)
    }
}

/// Action applied by a barcode scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanAction {
    Move,
    Block,
    Quarantine,
    Release,
    Note,
}

/// Structured payload of a serial event, keyed by event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SerialEventKind {
    Created,
    Moved { from: Option<String>, to: String },
    Quarantined,
    Released,
    Blocked,
    /// Nested into a container serial; nesting propagates nothing.
    Packed { container: String },
    Note { text: String },
}

/// One entry in a serial's append-only, newest-first audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialEvent {
    pub id: EventId,
    pub at: DateTime<Utc>,
    pub actor: String,
    pub note: Option<String>,
    pub kind: SerialEventKind,
}

impl SerialEvent {
    pub fn new(kind: SerialEventKind, actor: impl Into<String>, note: Option<String>) -> Self {
        Self {
            id: EventId::new(),
            at: Utc::now(),
            actor: actor.into(),
            note,
            kind,
        }
    }
}

/// An individually tracked packaging sub-unit belonging to a lot.
///
/// `lot_code` is a non-owning back-reference: the relation only, the lot does
/// not own the serial record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialUnit {
    id: SerialUnitId,
    serial: String,
    lot_code: String,
    item_code: String,
    unit: String,
    unit_type: UnitType,
    qty: Decimal,
    status: SerialStatus,
    location: Option<String>,
    /// Weak reference to a container serial; nesting, not ownership.
    packed_in: Option<String>,
    created_at: DateTime<Utc>,
    events: Vec<SerialEvent>,
}

impl Entity for SerialUnit {
    type Id = SerialUnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl SerialUnit {
    pub(crate) fn new(
        serial: String,
        lot_code: String,
        item_code: String,
        unit: String,
        unit_type: UnitType,
        qty: Decimal,
        location: Option<String>,
        actor: &str,
    ) -> Self {
        let mut unit_record = Self {
            id: SerialUnitId::new(),
            serial,
            lot_code,
            item_code,
            unit,
            unit_type,
            qty,
            status: SerialStatus::Available,
            location,
            packed_in: None,
            created_at: Utc::now(),
            events: Vec::new(),
        };
        unit_record.push_event(SerialEvent::new(SerialEventKind::Created, actor, None));
        unit_record
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn lot_code(&self) -> &str {
        &self.lot_code
    }

    pub fn item_code(&self) -> &str {
        &self.item_code
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn qty(&self) -> Decimal {
        self.qty
    }

    pub fn status(&self) -> SerialStatus {
        self.status
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn packed_in(&self) -> Option<&str> {
        self.packed_in.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Audit trail, newest-first.
    pub fn events(&self) -> &[SerialEvent] {
        &self.events
    }

    pub(crate) fn move_to(
        &mut self,
        to: String,
        actor: &str,
        note: Option<String>,
    ) -> LedgerResult<()> {
        if self.status.blocks_movement() {
            return Err(LedgerError::invalid_state(format!(
                "serial {} is {:?} and cannot be moved",
                self.serial, self.status
            )));
        }
        let from = self.location.replace(to.clone());
        self.push_event(SerialEvent::new(
            SerialEventKind::Moved { from, to },
            actor,
            note,
        ));
        Ok(())
    }

    pub(crate) fn quarantine(&mut self, actor: &str, note: Option<String>) {
        self.status = SerialStatus::Quarantine;
        self.push_event(SerialEvent::new(SerialEventKind::Quarantined, actor, note));
    }

    pub(crate) fn release(&mut self, actor: &str, note: Option<String>) -> LedgerResult<()> {
        if self.status != SerialStatus::Quarantine {
            return Err(LedgerError::invalid_state(format!(
                "serial {} is {:?}, only quarantined serials can be released",
                self.serial, self.status
            )));
        }
        self.status = SerialStatus::Available;
        self.push_event(SerialEvent::new(SerialEventKind::Released, actor, note));
        Ok(())
    }

    pub(crate) fn block(&mut self, actor: &str, note: Option<String>) {
        self.status = SerialStatus::Blocked;
        self.push_event(SerialEvent::new(SerialEventKind::Blocked, actor, note));
    }

    pub(crate) fn add_note(&mut self, text: String, actor: &str) {
        self.push_event(SerialEvent::new(SerialEventKind::Note { text }, actor, None));
    }

    pub(crate) fn pack_into(&mut self, container: String, actor: &str) {
        self.packed_in = Some(container.clone());
        self.push_event(SerialEvent::new(
            SerialEventKind::Packed { container },
            actor,
            None,
        ));
    }

    fn push_event(&mut self, event: SerialEvent) {
        self.events.insert(0, event);
    }
}
