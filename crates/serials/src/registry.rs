//! Registry owning all serialized sub-units, keyed by serial number.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tracelot_core::{LedgerError, LedgerResult};

use crate::serial::{ScanAction, SerialUnit, UnitType};

/// Command: generate a batch of serialized sub-units for a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSerials {
    pub lot_code: String,
    pub item_code: String,
    pub unit: String,
    pub prefix: String,
    pub count: u32,
    pub unit_type: UnitType,
    pub qty_per_unit: Decimal,
    pub location: Option<String>,
    pub actor: String,
}

/// Owns every SerialUnit record.
#[derive(Debug, Default)]
pub struct SerialRegistry {
    serials: HashMap<String, SerialUnit>,
}

impl SerialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate `count` serial units with sequentially derived serial numbers
    /// (`PREFIX-NNNN`, continuing from the highest existing suffix for that
    /// prefix). Does not touch the owning lot's quantity.
    pub fn create_serials(&mut self, cmd: CreateSerials) -> LedgerResult<Vec<SerialUnit>> {
        if cmd.prefix.trim().is_empty() {
            return Err(LedgerError::validation("serial prefix cannot be empty"));
        }
        if cmd.count == 0 {
            return Err(LedgerError::validation("serial count must be at least 1"));
        }
        if cmd.qty_per_unit <= Decimal::ZERO {
            return Err(LedgerError::invalid_quantity(format!(
                "quantity per unit must be positive (got {})",
                cmd.qty_per_unit
            )));
        }

        // Derive all serial numbers and verify uniqueness before inserting
        // anything, so a collision leaves the registry untouched.
        let start = self.next_index(&cmd.prefix);
        let numbers: Vec<String> = (0..cmd.count)
            .map(|i| format!("{}-{:04}", cmd.prefix, start + i))
            .collect();
        if let Some(dup) = numbers.iter().find(|n| self.serials.contains_key(*n)) {
            return Err(LedgerError::conflict(format!("serial {dup} already exists")));
        }

        let mut created = Vec::with_capacity(numbers.len());
        for number in numbers {
            let unit = SerialUnit::new(
                number.clone(),
                cmd.lot_code.clone(),
                cmd.item_code.clone(),
                cmd.unit.clone(),
                cmd.unit_type,
                cmd.qty_per_unit,
                cmd.location.clone(),
                &cmd.actor,
            );
            created.push(unit.clone());
            self.serials.insert(number, unit);
        }
        Ok(created)
    }

    /// Apply one scan action to a serial.
    pub fn scan(
        &mut self,
        serial: &str,
        action: ScanAction,
        to_location: Option<String>,
        note: Option<String>,
        actor: &str,
    ) -> LedgerResult<&SerialUnit> {
        let unit = self
            .serials
            .get_mut(serial)
            .ok_or_else(|| LedgerError::not_found(format!("serial {serial}")))?;

        match action {
            ScanAction::Move => {
                let to = to_location.ok_or_else(|| {
                    LedgerError::validation("move scan requires a target location")
                })?;
                unit.move_to(to, actor, note)?;
            }
            ScanAction::Block => unit.block(actor, note),
            ScanAction::Quarantine => unit.quarantine(actor, note),
            ScanAction::Release => unit.release(actor, note)?,
            ScanAction::Note => {
                let text = note.ok_or_else(|| {
                    LedgerError::validation("note scan requires note text")
                })?;
                unit.add_note(text, actor);
            }
        }
        Ok(unit)
    }

    /// Nest a serial into a container serial. Propagates nothing.
    pub fn pack(
        &mut self,
        serial: &str,
        container: &str,
        actor: &str,
    ) -> LedgerResult<&SerialUnit> {
        if serial == container {
            return Err(LedgerError::validation(format!(
                "serial {serial} cannot be packed into itself"
            )));
        }
        if !self.serials.contains_key(container) {
            return Err(LedgerError::not_found(format!("container serial {container}")));
        }
        let unit = self
            .serials
            .get_mut(serial)
            .ok_or_else(|| LedgerError::not_found(format!("serial {serial}")))?;
        unit.pack_into(container.to_string(), actor);
        Ok(unit)
    }

    pub fn get(&self, serial: &str) -> Option<&SerialUnit> {
        self.serials.get(serial)
    }

    pub fn resolve(&self, serial: &str) -> LedgerResult<&SerialUnit> {
        self.serials
            .get(serial)
            .ok_or_else(|| LedgerError::not_found(format!("serial {serial}")))
    }

    pub fn len(&self) -> usize {
        self.serials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SerialUnit> {
        self.serials.values()
    }

    /// Serials currently at a location code (occupancy scan).
    pub fn serials_in_location<'a>(&'a self, location: &str) -> Vec<&'a SerialUnit> {
        self.serials
            .values()
            .filter(|s| s.location() == Some(location))
            .collect()
    }

    /// Serials belonging to a lot.
    pub fn serials_for_lot<'a>(&'a self, lot_code: &str) -> Vec<&'a SerialUnit> {
        self.serials
            .values()
            .filter(|s| s.lot_code() == lot_code)
            .collect()
    }

    fn next_index(&self, prefix: &str) -> u32 {
        let lead = format!("{prefix}-");
        self.serials
            .keys()
            .filter_map(|s| s.strip_prefix(&lead))
            .filter_map(|suffix| suffix.parse::<u32>().ok())
            .max()
            .map(|max| max + 1)
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::{SerialEventKind, SerialStatus};
    use rust_decimal_macros::dec;

    fn batch(prefix: &str, count: u32) -> CreateSerials {
        CreateSerials {
            lot_code: "LOT-PT-0007".to_string(),
            item_code: "PT-ROLL".to_string(),
            unit: "kg".to_string(),
            prefix: prefix.to_string(),
            count,
            unit_type: UnitType::Box,
            qty_per_unit: dec!(25),
            location: Some("WH1-A-01".to_string()),
            actor: "packer".to_string(),
        }
    }

    #[test]
    fn create_serials_derives_sequential_numbers() {
        let mut reg = SerialRegistry::new();
        let created = reg.create_serials(batch("BOX", 3)).unwrap();
        let numbers: Vec<&str> = created.iter().map(|s| s.serial()).collect();
        assert_eq!(numbers, vec!["BOX-0001", "BOX-0002", "BOX-0003"]);
        assert!(created.iter().all(|s| s.status() == SerialStatus::Available));
        assert!(created
            .iter()
            .all(|s| matches!(s.events()[0].kind, SerialEventKind::Created)));
    }

    #[test]
    fn second_batch_continues_the_sequence() {
        let mut reg = SerialRegistry::new();
        reg.create_serials(batch("BOX", 2)).unwrap();
        let created = reg.create_serials(batch("BOX", 2)).unwrap();
        let numbers: Vec<&str> = created.iter().map(|s| s.serial()).collect();
        assert_eq!(numbers, vec!["BOX-0003", "BOX-0004"]);
        assert_eq!(reg.len(), 4);
    }

    #[test]
    fn create_serials_validates_inputs() {
        let mut reg = SerialRegistry::new();
        assert!(matches!(
            reg.create_serials(batch("", 1)).unwrap_err(),
            LedgerError::Validation(_)
        ));
        assert!(matches!(
            reg.create_serials(batch("BOX", 0)).unwrap_err(),
            LedgerError::Validation(_)
        ));
        let mut cmd = batch("BOX", 1);
        cmd.qty_per_unit = Decimal::ZERO;
        assert!(matches!(
            reg.create_serials(cmd).unwrap_err(),
            LedgerError::InvalidQuantity(_)
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn scan_move_updates_location_and_appends_event() {
        let mut reg = SerialRegistry::new();
        reg.create_serials(batch("BOX", 1)).unwrap();

        let unit = reg
            .scan("BOX-0001", ScanAction::Move, Some("WH1-B-02".to_string()), None, "op1")
            .unwrap();
        assert_eq!(unit.location(), Some("WH1-B-02"));
        match &unit.events()[0].kind {
            SerialEventKind::Moved { from, to } => {
                assert_eq!(from.as_deref(), Some("WH1-A-01"));
                assert_eq!(to, "WH1-B-02");
            }
            other => panic!("expected Moved event, got {other:?}"),
        }
    }

    #[test]
    fn scan_move_requires_location_and_respects_holds() {
        let mut reg = SerialRegistry::new();
        reg.create_serials(batch("BOX", 1)).unwrap();

        assert!(matches!(
            reg.scan("BOX-0001", ScanAction::Move, None, None, "op1")
                .unwrap_err(),
            LedgerError::Validation(_)
        ));

        reg.scan("BOX-0001", ScanAction::Quarantine, None, None, "qa1")
            .unwrap();
        assert!(matches!(
            reg.scan("BOX-0001", ScanAction::Move, Some("WH1-C-01".to_string()), None, "op1")
                .unwrap_err(),
            LedgerError::InvalidState(_)
        ));

        reg.scan("BOX-0001", ScanAction::Release, None, None, "qa1")
            .unwrap();
        assert_eq!(reg.get("BOX-0001").unwrap().status(), SerialStatus::Available);
    }

    #[test]
    fn release_requires_quarantine() {
        let mut reg = SerialRegistry::new();
        reg.create_serials(batch("BOX", 1)).unwrap();
        assert!(matches!(
            reg.scan("BOX-0001", ScanAction::Release, None, None, "qa1")
                .unwrap_err(),
            LedgerError::InvalidState(_)
        ));
    }

    #[test]
    fn pack_sets_weak_container_reference() {
        let mut reg = SerialRegistry::new();
        reg.create_serials(batch("BOX", 2)).unwrap();

        let unit = reg.pack("BOX-0001", "BOX-0002", "packer").unwrap();
        assert_eq!(unit.packed_in(), Some("BOX-0002"));
        // Container is untouched by the nesting.
        let container = reg.get("BOX-0002").unwrap();
        assert_eq!(container.status(), SerialStatus::Available);
        assert_eq!(container.events().len(), 1);

        assert!(matches!(
            reg.pack("BOX-0001", "BOX-0001", "packer").unwrap_err(),
            LedgerError::Validation(_)
        ));
        assert!(matches!(
            reg.pack("BOX-0001", "MISSING", "packer").unwrap_err(),
            LedgerError::NotFound(_)
        ));
    }
}
