use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::utils::constants::DATE_FORMAT;

/// One row of the wide source table: a (date, hour, type) key plus one value per city.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub date: String,
    pub hour: String,
    pub measurement_type: String,
    /// Aligned with `WideTable::cities`
    pub values: Vec<Option<f64>>,
}

impl WideRow {
    pub fn new(
        date: impl Into<String>,
        hour: impl Into<String>,
        measurement_type: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Self {
        Self {
            date: date.into(),
            hour: hour.into(),
            measurement_type: measurement_type.into(),
            values,
        }
    }

    /// Combine `date` and the zero-padded `hour` into an hourly instant
    pub fn timestamp(&self) -> Result<NaiveDateTime> {
        parse_timestamp(&self.date, &self.hour)
    }
}

/// Parse an 8-digit `YYYYMMDD` date and a 1-2 digit hour in `0..=23`.
pub fn parse_timestamp(date: &str, hour: &str) -> Result<NaiveDateTime> {
    let date = date.trim();
    let hour = hour.trim();
    let invalid = |reason: &str| {
        AnalysisError::Load(format!(
            "Invalid timestamp fields date='{}' hour='{}': {}",
            date, hour, reason
        ))
    };

    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("date must be 8 digits (YYYYMMDD)"));
    }
    if hour.is_empty() || hour.len() > 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("hour must be 1 or 2 digits"));
    }

    let day = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|e| invalid(&e.to_string()))?;
    let hour: u32 = hour.parse().map_err(|_| invalid("hour is not a number"))?;
    day.and_hms_opt(hour, 0, 0)
        .ok_or_else(|| invalid("hour must be between 0 and 23"))
}

/// The raw table as loaded: city columns in header order.
#[derive(Debug, Clone, Default)]
pub struct WideTable {
    pub cities: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn new(cities: Vec<String>, rows: Vec<WideRow>) -> Self {
        Self { cities, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Measurement types in first-seen order
    pub fn measurement_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for row in &self.rows {
            if !types.contains(&row.measurement_type) {
                types.push(row.measurement_type.clone());
            }
        }
        types
    }
}

/// One cell of the wide table after melting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    pub timestamp: NaiveDateTime,
    pub city: String,
    pub measurement_type: String,
    pub value: Option<f64>,
}

impl LongRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        city: String,
        measurement_type: String,
        value: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            city,
            measurement_type,
            value,
        }
    }
}
