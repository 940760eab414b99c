//! Registry owning all canonical lot records, keyed by business code.

use std::collections::HashMap;

use tracelot_core::{LedgerError, LedgerResult};

use crate::lot::{Lot, NewLot};

/// Owns every Lot record. Lots are never deleted; terminal statuses retain
/// the record and its audit trail.
///
/// The registry is an explicit object owned by the hosting store, never
/// module-level shared state.
#[derive(Debug, Default)]
pub struct LotRegistry {
    lots: HashMap<String, Lot>,
}

impl LotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lot; the business code must be unique across the registry.
    pub fn create(&mut self, spec: NewLot) -> LedgerResult<&Lot> {
        if self.lots.contains_key(&spec.code) {
            return Err(LedgerError::conflict(format!(
                "lot code {} already exists",
                spec.code
            )));
        }
        let lot = Lot::create(spec)?;
        let code = lot.code().to_string();
        Ok(self.lots.entry(code).or_insert(lot))
    }

    /// Admit an already-built lot (split/merge child creation path).
    pub fn insert(&mut self, lot: Lot) -> LedgerResult<&Lot> {
        if self.lots.contains_key(lot.code()) {
            return Err(LedgerError::conflict(format!(
                "lot code {} already exists",
                lot.code()
            )));
        }
        let code = lot.code().to_string();
        Ok(self.lots.entry(code).or_insert(lot))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lots.contains_key(code)
    }

    pub fn get(&self, code: &str) -> Option<&Lot> {
        self.lots.get(code)
    }

    pub fn resolve(&self, code: &str) -> LedgerResult<&Lot> {
        self.lots
            .get(code)
            .ok_or_else(|| LedgerError::not_found(format!("lot {code}")))
    }

    pub fn resolve_mut(&mut self, code: &str) -> LedgerResult<&mut Lot> {
        self.lots
            .get_mut(code)
            .ok_or_else(|| LedgerError::not_found(format!("lot {code}")))
    }

    /// Any non-terminal lot → quarantine hold.
    pub fn quarantine(&mut self, code: &str, actor: &str) -> LedgerResult<&Lot> {
        let lot = self.resolve_mut(code)?;
        lot.quarantine(actor)?;
        Ok(lot)
    }

    /// Quarantine → available.
    pub fn release(&mut self, code: &str, actor: &str) -> LedgerResult<&Lot> {
        let lot = self.resolve_mut(code)?;
        lot.release(actor)?;
        Ok(lot)
    }

    /// Any non-terminal lot → blocked, with a reason.
    pub fn block(&mut self, code: &str, reason: &str, actor: &str) -> LedgerResult<&Lot> {
        let lot = self.resolve_mut(code)?;
        lot.block(reason, actor)?;
        Ok(lot)
    }

    /// Append a note event without changing status.
    pub fn add_note(&mut self, code: &str, text: &str, actor: &str) -> LedgerResult<&Lot> {
        let lot = self.resolve_mut(code)?;
        lot.add_note(text, actor);
        Ok(lot)
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lot> {
        self.lots.values()
    }

    /// Lots currently at a location code (occupancy scan).
    pub fn lots_in_location<'a>(&'a self, location: &str) -> Vec<&'a Lot> {
        self.lots
            .values()
            .filter(|lot| lot.location() == Some(location))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lot::{LotKind, LotStatus};
    use rust_decimal_macros::dec;

    fn new_lot(code: &str) -> NewLot {
        NewLot::new(code, LotKind::RawMaterial, "MP-STEEL", dec!(100), "kg", "tester")
    }

    #[test]
    fn create_and_resolve() {
        let mut reg = LotRegistry::new();
        reg.create(new_lot("LOT-1")).unwrap();
        assert_eq!(reg.resolve("LOT-1").unwrap().qty(), dec!(100));
        assert!(matches!(
            reg.resolve("LOT-MISSING").unwrap_err(),
            LedgerError::NotFound(_)
        ));
    }

    #[test]
    fn duplicate_code_is_a_conflict() {
        let mut reg = LotRegistry::new();
        reg.create(new_lot("LOT-1")).unwrap();
        let err = reg.create(new_lot("LOT-1")).unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn quarantine_and_release_through_registry() {
        let mut reg = LotRegistry::new();
        reg.create(new_lot("LOT-1")).unwrap();

        let lot = reg.quarantine("LOT-1", "qa1").unwrap();
        assert_eq!(lot.status(), LotStatus::Quarantine);

        let lot = reg.release("LOT-1", "qa1").unwrap();
        assert_eq!(lot.status(), LotStatus::Available);
    }

    #[test]
    fn lots_in_location_filters_by_current_location() {
        let mut reg = LotRegistry::new();
        let mut spec = new_lot("LOT-1");
        spec.location = Some("WH1-A-01".to_string());
        reg.create(spec).unwrap();
        reg.create(new_lot("LOT-2")).unwrap();

        assert_eq!(reg.lots_in_location("WH1-A-01").len(), 1);
        assert_eq!(reg.lots_in_location("WH1-B-01").len(), 0);
    }
}
