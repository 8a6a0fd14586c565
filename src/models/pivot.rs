use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::pollutant::normalize_type_name;

/// One (timestamp, city) row of the pivoted table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRecord {
    pub timestamp: NaiveDateTime,
    pub city: String,
    /// Only types with a value are present; absent means unavailable
    pub values: BTreeMap<String, f64>,
}

impl PivotRecord {
    pub fn new(timestamp: NaiveDateTime, city: String) -> Self {
        Self {
            timestamp,
            city,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, measurement_type: &str) -> Option<f64> {
        self.values.get(measurement_type).copied()
    }
}

/// Pivoted table: unique on (timestamp, city), sorted by timestamp then city.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PivotTable {
    /// Measurement types that carry at least one value, in first-seen order
    pub columns: Vec<String>,
    pub records: Vec<PivotRecord>,
}

impl PivotTable {
    pub fn new(columns: Vec<String>, records: Vec<PivotRecord>) -> Self {
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, measurement_type: &str) -> bool {
        self.columns.iter().any(|c| c == measurement_type)
    }

    /// Find the actual column name for a requested name, tolerating case and
    /// punctuation variants. Exact matches win over folded ones.
    pub fn resolve_column(&self, requested: &str) -> Option<&str> {
        if let Some(exact) = self.columns.iter().find(|c| c.as_str() == requested) {
            return Some(exact.as_str());
        }
        let key = normalize_type_name(requested);
        self.columns
            .iter()
            .find(|c| normalize_type_name(c) == key)
            .map(|c| c.as_str())
    }

    /// Row with the maximum timestamp for `city`
    pub fn latest_for_city(&self, city: &str) -> Option<&PivotRecord> {
        self.records
            .iter()
            .filter(|r| r.city == city)
            .max_by_key(|r| r.timestamp)
    }

    /// Values of one column, row-aligned, `None` where unavailable
    pub fn column_values(&self, measurement_type: &str) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.get(measurement_type)).collect()
    }
}
