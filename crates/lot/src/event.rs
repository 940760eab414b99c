//! Lot audit-trail events.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tracelot_core::{BusinessRefs, EventId};

/// Structured payload of a lot event, keyed by event type.
///
/// A closed union instead of an open metadata map: consumers get
/// exhaustiveness checking, and each variant carries exactly the fields that
/// event type is defined to have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LotEventKind {
    /// Lot record created (explicitly or as a split/merge child).
    Created,
    /// Placed on hold pending inspection.
    Quarantined,
    /// Released from quarantine back to available.
    Released,
    /// Hard-blocked; no transition out is defined.
    Blocked { reason: String },
    /// Physical transfer between locations. Quantity is unaffected.
    Moved {
        from: Option<String>,
        to: String,
    },
    /// Quantity consumed into production.
    Consumed {
        qty: Decimal,
        unit: String,
        refs: BusinessRefs,
    },
    /// Quantity split out into child lots.
    Split { total: Decimal, unit: String },
    /// Quantity contributed to or received from a merge.
    Merged { qty: Decimal, unit: String },
    /// Free-form annotation; no status or quantity effect.
    Note { text: String },
}

/// One entry in a lot's append-only, newest-first audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotEvent {
    pub id: EventId,
    pub at: DateTime<Utc>,
    /// Opaque actor string; the ledger never authenticates it.
    pub actor: String,
    pub note: Option<String>,
    pub kind: LotEventKind,
}

impl LotEvent {
    pub fn new(kind: LotEventKind, actor: impl Into<String>, note: Option<String>) -> Self {
        Self {
            id: EventId::new(),
            at: Utc::now(),
            actor: actor.into(),
            note,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn event_kind_serializes_with_type_tag() {
        let kind = LotEventKind::Moved {
            from: Some("WH1-A-01".to_string()),
            to: "WH1-B-02".to_string(),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "moved");
        assert_eq!(json["from"], "WH1-A-01");
        assert_eq!(json["to"], "WH1-B-02");
    }

    #[test]
    fn consumed_payload_round_trips() {
        let kind = LotEventKind::Consumed {
            qty: dec!(150),
            unit: "kg".to_string(),
            refs: BusinessRefs::for_order("WO-0001"),
        };
        let json = serde_json::to_string(&kind).unwrap();
        let back: LotEventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, back);
    }
}
