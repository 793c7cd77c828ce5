// Inventory aggregate rows - the table shapes returned by the aggregation service
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Vehicle count for one make. The count column is named `vin`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MakeCount {
    pub make: String,
    pub vin: u64,
}

impl MakeCount {
    pub fn new(make: impl Into<String>, vin: u64) -> Self {
        Self {
            make: make.into(),
            vin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyPrice {
    #[serde(deserialize_with = "month_from_str")]
    pub inventory_month: NaiveDate,
    pub price: f64,
}

impl MonthlyPrice {
    pub fn new(inventory_month: NaiveDate, price: f64) -> Self {
        Self {
            inventory_month,
            price,
        }
    }
}

/// Mean number of listings per dealership in a month.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyInventorySize {
    #[serde(deserialize_with = "month_from_str")]
    pub inventory_month: NaiveDate,
    pub inventory_size: f64,
}

impl MonthlyInventorySize {
    pub fn new(inventory_month: NaiveDate, inventory_size: f64) -> Self {
        Self {
            inventory_month,
            inventory_size,
        }
    }
}

/// Accepts `2024-03-01` as well as `2024-03-01T00:00:00[...]`.
fn month_from_str<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date_part = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}
