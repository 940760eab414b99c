//! Business reference bundle.

use serde::{Deserialize, Serialize};

/// Optional business references carried on movements, genealogy edges and
/// consumption events: which order/operation/machine/shift caused the change.
///
/// These are opaque codes owned by collaborating systems; the ledger records
/// them for audit and never resolves them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRefs {
    pub order_code: Option<String>,
    pub operation_code: Option<String>,
    pub machine_code: Option<String>,
    pub shift_code: Option<String>,
}

impl BusinessRefs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn for_order(order_code: impl Into<String>) -> Self {
        Self {
            order_code: Some(order_code.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order_code.is_none()
            && self.operation_code.is_none()
            && self.machine_code.is_none()
            && self.shift_code.is_none()
    }
}
