//! Static warehouse location reference data.

use serde::{Deserialize, Serialize};

use tracelot_core::{Entity, LocationId};

/// One physical storage location. Reference data only; occupancy is derived,
/// never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseLocation {
    pub id: LocationId,
    /// Unique location code, e.g. "WH1-A-01-1".
    pub code: String,
    pub zone: String,
    pub area: String,
    pub rack: Option<String>,
    pub level: Option<String>,
    pub capacity: Option<u32>,
    pub notes: Option<String>,
}

impl WarehouseLocation {
    pub fn new(
        code: impl Into<String>,
        zone: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        Self {
            id: LocationId::new(),
            code: code.into(),
            zone: zone.into(),
            area: area.into(),
            rack: None,
            level: None,
            capacity: None,
            notes: None,
        }
    }
}

impl Entity for WarehouseLocation {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
