use crate::error::Result;
use crate::models::{LongRecord, PivotRecord, PivotTable, WideTable};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::debug;

/// Turns the wide source table into the long and pivoted forms.
pub struct DataReshaper;

impl DataReshaper {
    pub fn new() -> Self {
        Self
    }

    /// One long record per (row, city) cell, missing cells included
    pub fn melt(&self, table: &WideTable) -> Result<Vec<LongRecord>> {
        let mut records = Vec::with_capacity(table.rows.len() * table.cities.len());

        for row in &table.rows {
            let timestamp = row.timestamp()?;
            for (city, value) in table.cities.iter().zip(&row.values) {
                records.push(LongRecord::new(
                    timestamp,
                    city.clone(),
                    row.measurement_type.clone(),
                    *value,
                ));
            }
        }

        debug!(records = records.len(), "Melted wide table");
        Ok(records)
    }

    /// Spread measurement types into columns, one row per (timestamp, city).
    ///
    /// Missing values are skipped, so a (timestamp, city) pair with no values
    /// at all produces no row. Duplicate cells are averaged.
    pub fn pivot(&self, records: &[LongRecord]) -> PivotTable {
        let mut columns: Vec<String> = Vec::new();
        let mut grouped: BTreeMap<(NaiveDateTime, &str), BTreeMap<&str, (f64, usize)>> =
            BTreeMap::new();

        for record in records {
            let Some(value) = record.value else {
                continue;
            };
            if !columns.contains(&record.measurement_type) {
                columns.push(record.measurement_type.clone());
            }
            let cell = grouped
                .entry((record.timestamp, record.city.as_str()))
                .or_default()
                .entry(record.measurement_type.as_str())
                .or_insert((0.0, 0));
            cell.0 += value;
            cell.1 += 1;
        }

        let pivoted: Vec<PivotRecord> = grouped
            .into_iter()
            .map(|((timestamp, city), cells)| {
                let mut record = PivotRecord::new(timestamp, city.to_string());
                for (measurement_type, (sum, count)) in cells {
                    record
                        .values
                        .insert(measurement_type.to_string(), sum / count as f64);
                }
                record
            })
            .collect();

        debug!(
            rows = pivoted.len(),
            columns = columns.len(),
            "Pivoted long table"
        );
        PivotTable::new(columns, pivoted)
    }
}

impl Default for DataReshaper {
    fn default() -> Self {
        Self::new()
    }
}
