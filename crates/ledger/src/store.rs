//! The explicit store object owned by the hosting process.
//!
//! `TraceStore` replaces any ambient singleton: the host constructs one and
//! passes it (by reference or `Arc`) to every caller. One lock serializes all
//! mutating operations end-to-end, so the validate-then-apply span of a
//! movement, split or merge is atomic with respect to every other caller.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use tracing::info;

use tracelot_core::{LedgerError, LedgerResult};
use tracelot_genealogy::{GenealogyGraph, LotLink};
use tracelot_lot::{Lot, LotRegistry, NewLot};
use tracelot_serials::{CreateSerials, ScanAction, SerialRegistry, SerialUnit, UnitType};
use tracelot_warehouse::{OccupancyLevel, WarehouseLocation, WarehouseLocationIndex};

use crate::merge::{merge, MergeCommand, MergeOutcome};
use crate::movement::{Movement, MovementCommand, MovementLedger};
use crate::split::{split, SplitCommand, SplitOutcome};

#[derive(Debug, Default)]
struct Inner {
    lots: LotRegistry,
    graph: GenealogyGraph,
    serials: SerialRegistry,
    movements: MovementLedger,
    index: WarehouseLocationIndex,
}

/// The lot traceability ledger behind a single mutual-exclusion boundary.
///
/// Results are owned snapshots; no caller ever observes a partially-applied
/// operation.
#[derive(Debug, Default)]
pub struct TraceStore {
    inner: RwLock<Inner>,
}

impl TraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct with warehouse location reference data.
    pub fn with_locations(locations: Vec<WarehouseLocation>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                index: WarehouseLocationIndex::new(locations),
                ..Inner::default()
            }),
        }
    }

    // A poisoned lock means another caller panicked mid-operation; surface it
    // as a conflict instead of propagating the panic.
    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::conflict("store lock poisoned"))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::conflict("store lock poisoned"))
    }

    // ---- lot lifecycle ----

    pub fn create_lot(&self, spec: NewLot) -> LedgerResult<Lot> {
        let mut inner = self.write()?;
        let lot = inner.lots.create(spec)?.clone();
        info!(lot = %lot.code(), qty = %lot.qty(), unit = %lot.unit(), "lot created");
        Ok(lot)
    }

    pub fn quarantine(&self, lot_code: &str, actor: &str) -> LedgerResult<Lot> {
        let mut inner = self.write()?;
        let lot = inner.lots.quarantine(lot_code, actor)?.clone();
        info!(lot = %lot_code, "lot quarantined");
        Ok(lot)
    }

    pub fn release(&self, lot_code: &str, actor: &str) -> LedgerResult<Lot> {
        let mut inner = self.write()?;
        let lot = inner.lots.release(lot_code, actor)?.clone();
        info!(lot = %lot_code, "lot released from quarantine");
        Ok(lot)
    }

    pub fn block(&self, lot_code: &str, reason: &str, actor: &str) -> LedgerResult<Lot> {
        let mut inner = self.write()?;
        let lot = inner.lots.block(lot_code, reason, actor)?.clone();
        info!(lot = %lot_code, reason = %reason, "lot blocked");
        Ok(lot)
    }

    pub fn add_note(&self, lot_code: &str, text: &str, actor: &str) -> LedgerResult<Lot> {
        let mut inner = self.write()?;
        Ok(inner.lots.add_note(lot_code, text, actor)?.clone())
    }

    // ---- transformations ----

    pub fn apply_movement(&self, cmd: MovementCommand) -> LedgerResult<Movement> {
        let mut inner = self.write()?;
        let inner = &mut *inner;
        let movement = inner.movements.apply(&mut inner.lots, cmd)?;
        info!(
            lot = %movement.lot_code,
            kind = movement.kind.as_str(),
            qty = %movement.qty,
            "movement applied"
        );
        Ok(movement)
    }

    pub fn split(&self, cmd: SplitCommand) -> LedgerResult<SplitOutcome> {
        let mut inner = self.write()?;
        let inner = &mut *inner;
        let outcome = split(&mut inner.lots, &mut inner.graph, cmd)?;
        info!(
            parent = %outcome.parent.code(),
            children = outcome.children.len(),
            "lot split"
        );
        Ok(outcome)
    }

    pub fn merge(&self, cmd: MergeCommand) -> LedgerResult<MergeOutcome> {
        let mut inner = self.write()?;
        let inner = &mut *inner;
        let outcome = merge(&mut inner.lots, &mut inner.graph, cmd)?;
        info!(
            child = %outcome.child.code(),
            parents = outcome.parents.len(),
            qty = %outcome.child.qty(),
            "lots merged"
        );
        Ok(outcome)
    }

    // ---- serials ----

    /// Generate serial units for a lot. Item code and unit come from the lot;
    /// an omitted location inherits the lot's current one.
    #[allow(clippy::too_many_arguments)]
    pub fn create_serials(
        &self,
        lot_code: &str,
        prefix: &str,
        count: u32,
        unit_type: UnitType,
        qty_per_unit: Decimal,
        location: Option<String>,
        actor: &str,
    ) -> LedgerResult<Vec<SerialUnit>> {
        let mut inner = self.write()?;
        let inner = &mut *inner;
        let lot = inner.lots.resolve(lot_code)?;
        let cmd = CreateSerials {
            lot_code: lot_code.to_string(),
            item_code: lot.item_code().to_string(),
            unit: lot.unit().to_string(),
            prefix: prefix.to_string(),
            count,
            unit_type,
            qty_per_unit,
            location: location.or_else(|| lot.location().map(str::to_string)),
            actor: actor.to_string(),
        };
        let created = inner.serials.create_serials(cmd)?;
        info!(lot = %lot_code, count = created.len(), "serials created");
        Ok(created)
    }

    pub fn scan_serial(
        &self,
        serial: &str,
        action: ScanAction,
        to_location: Option<String>,
        note: Option<String>,
        actor: &str,
    ) -> LedgerResult<SerialUnit> {
        let mut inner = self.write()?;
        let unit = inner
            .serials
            .scan(serial, action, to_location, note, actor)?
            .clone();
        info!(serial = %serial, action = ?action, "serial scanned");
        Ok(unit)
    }

    pub fn pack_serial(
        &self,
        serial: &str,
        container: &str,
        actor: &str,
    ) -> LedgerResult<SerialUnit> {
        let mut inner = self.write()?;
        Ok(inner.serials.pack(serial, container, actor)?.clone())
    }

    // ---- queries (read lock only) ----

    pub fn lot(&self, code: &str) -> LedgerResult<Lot> {
        Ok(self.read()?.lots.resolve(code)?.clone())
    }

    pub fn serial(&self, serial: &str) -> LedgerResult<SerialUnit> {
        Ok(self.read()?.serials.resolve(serial)?.clone())
    }

    /// Immediate parent edges of a lot.
    pub fn upstream(&self, lot_code: &str) -> LedgerResult<Vec<LotLink>> {
        Ok(self
            .read()?
            .graph
            .upstream(lot_code)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Immediate child edges of a lot.
    pub fn downstream(&self, lot_code: &str) -> LedgerResult<Vec<LotLink>> {
        Ok(self
            .read()?
            .graph
            .downstream(lot_code)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Full movement ledger, newest-first.
    pub fn movements(&self) -> LedgerResult<Vec<Movement>> {
        Ok(self.read()?.movements.entries().to_vec())
    }

    pub fn movements_for_lot(&self, lot_code: &str) -> LedgerResult<Vec<Movement>> {
        Ok(self
            .read()?
            .movements
            .entries_for_lot(lot_code)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn lots_in_location(&self, location: &str) -> LedgerResult<Vec<Lot>> {
        Ok(self
            .read()?
            .lots
            .lots_in_location(location)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn serials_in_location(&self, location: &str) -> LedgerResult<Vec<SerialUnit>> {
        Ok(self
            .read()?
            .serials
            .serials_in_location(location)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn occupancy(&self, location: &str) -> LedgerResult<usize> {
        let inner = self.read()?;
        Ok(inner.index.occupancy(location, &inner.lots, &inner.serials))
    }

    pub fn occupancy_level(&self, location: &str) -> LedgerResult<OccupancyLevel> {
        let inner = self.read()?;
        Ok(inner
            .index
            .occupancy_level(location, &inner.lots, &inner.serials))
    }

    // ---- warehouse reference data ----

    pub fn add_location(&self, location: WarehouseLocation) -> LedgerResult<()> {
        self.write()?.index.add(location);
        Ok(())
    }

    pub fn zones(&self) -> LedgerResult<Vec<String>> {
        Ok(self.read()?.index.zones())
    }

    pub fn areas(&self, zone: &str) -> LedgerResult<Vec<String>> {
        Ok(self.read()?.index.areas(zone))
    }

    pub fn locations(&self, zone: &str, area: &str) -> LedgerResult<Vec<WarehouseLocation>> {
        Ok(self
            .read()?
            .index
            .locations(zone, area)
            .into_iter()
            .cloned()
            .collect())
    }
}
