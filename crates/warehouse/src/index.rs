//! Read-only occupancy index over the lot and serial registries.

use serde::{Deserialize, Serialize};

use tracelot_core::{LedgerError, LedgerResult};
use tracelot_lot::LotRegistry;
use tracelot_serials::SerialRegistry;

use crate::location::WarehouseLocation;

/// Occupancy bucket for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyLevel {
    Empty,
    Low,
    Medium,
    High,
}

impl OccupancyLevel {
    /// 0 → empty, 1–2 → low, 3–5 → medium, 6+ → high.
    pub fn classify(count: usize) -> Self {
        match count {
            0 => OccupancyLevel::Empty,
            1..=2 => OccupancyLevel::Low,
            3..=5 => OccupancyLevel::Medium,
            _ => OccupancyLevel::High,
        }
    }
}

/// Pure query surface over warehouse reference data plus the registries.
///
/// Holds only the static location list; registries are borrowed per query so
/// the index can never mutate them.
#[derive(Debug, Default)]
pub struct WarehouseLocationIndex {
    locations: Vec<WarehouseLocation>,
}

impl WarehouseLocationIndex {
    pub fn new(locations: Vec<WarehouseLocation>) -> Self {
        Self { locations }
    }

    pub fn add(&mut self, location: WarehouseLocation) {
        self.locations.push(location);
    }

    pub fn find(&self, code: &str) -> Option<&WarehouseLocation> {
        self.locations.iter().find(|l| l.code == code)
    }

    pub fn resolve(&self, code: &str) -> LedgerResult<&WarehouseLocation> {
        self.find(code)
            .ok_or_else(|| LedgerError::not_found(format!("location {code}")))
    }

    /// Distinct zones, sorted.
    pub fn zones(&self) -> Vec<String> {
        let mut zones: Vec<String> = self.locations.iter().map(|l| l.zone.clone()).collect();
        zones.sort();
        zones.dedup();
        zones
    }

    /// Distinct areas within a zone, sorted.
    pub fn areas(&self, zone: &str) -> Vec<String> {
        let mut areas: Vec<String> = self
            .locations
            .iter()
            .filter(|l| l.zone == zone)
            .map(|l| l.area.clone())
            .collect();
        areas.sort();
        areas.dedup();
        areas
    }

    /// Locations within a zone + area.
    pub fn locations(&self, zone: &str, area: &str) -> Vec<&WarehouseLocation> {
        self.locations
            .iter()
            .filter(|l| l.zone == zone && l.area == area)
            .collect()
    }

    /// Count of lots plus serial units currently at the location code.
    pub fn occupancy(
        &self,
        code: &str,
        lots: &LotRegistry,
        serials: &SerialRegistry,
    ) -> usize {
        lots.lots_in_location(code).len() + serials.serials_in_location(code).len()
    }

    /// Occupancy classified into the visualization buckets.
    pub fn occupancy_level(
        &self,
        code: &str,
        lots: &LotRegistry,
        serials: &SerialRegistry,
    ) -> OccupancyLevel {
        OccupancyLevel::classify(self.occupancy(code, lots, serials))
    }
}
