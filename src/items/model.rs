//! Item data model and create-payload validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored measurement item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub created: DateTime<Utc>,
}

/// Raw create payload as submitted by a client.
///
/// Every field is optional so that missing fields are reported together
/// instead of failing on the first one during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
}

/// A validated create payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

/// Why a create payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidItem {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid field: value must be a finite number")]
    NonFiniteValue,
}

impl CreateItemRequest {
    /// Check that `name`, `value` and `unit` are present; blank strings count
    /// as missing. Missing fields are reported before a non-finite `value`.
    pub fn validate(self) -> Result<NewItem, InvalidItem> {
        let name = self.name.filter(|s| !s.trim().is_empty());
        let unit = self.unit.filter(|s| !s.trim().is_empty());

        match (name, self.value, unit) {
            (Some(_), Some(value), Some(_)) if !value.is_finite() => Err(InvalidItem::NonFiniteValue),
            (Some(name), Some(value), Some(unit)) => Ok(NewItem { name, value, unit }),
            (name, value, unit) => {
                let mut missing = Vec::with_capacity(3);
                if name.is_none() {
                    missing.push("name");
                }
                if value.is_none() {
                    missing.push("value");
                }
                if unit.is_none() {
                    missing.push("unit");
                }
                Err(InvalidItem::MissingFields(missing))
            }
        }
    }
}
