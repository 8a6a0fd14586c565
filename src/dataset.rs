use crate::error::Result;
use crate::models::{LongRecord, PivotTable, WideTable};
use crate::processors::DataReshaper;
use crate::readers::WideTableReader;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Shape overview printed by the `info` command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub wide_rows: usize,
    pub long_records: usize,
    pub pivot_rows: usize,
    pub cities: Vec<String>,
    pub measurement_types: Vec<String>,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub missing_cells: usize,
}

impl DatasetInfo {
    pub fn missing_share(&self) -> f64 {
        if self.long_records == 0 {
            0.0
        } else {
            self.missing_cells as f64 / self.long_records as f64
        }
    }

    pub fn summary(&self) -> String {
        let range = match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "empty".to_string(),
        };
        format!(
            "Rows: {} wide, {} long, {} pivoted\n\
            Cities: {}\n\
            Measurement types: {}\n\
            Time range: {}\n\
            Missing cells: {} ({:.1}%)",
            self.wide_rows,
            self.long_records,
            self.pivot_rows,
            self.cities.len(),
            self.measurement_types.join(", "),
            range,
            self.missing_cells,
            self.missing_share() * 100.0
        )
    }
}

/// The loaded table in all three shapes. Built once per process and shared
/// by reference; nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    wide: WideTable,
    long: Vec<LongRecord>,
    pivot: PivotTable,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_reader(path, &WideTableReader::new())
    }

    pub fn load_with_reader(path: &Path, reader: &WideTableReader) -> Result<Self> {
        Self::from_table(reader.read_table(path)?)
    }

    pub fn from_table(wide: WideTable) -> Result<Self> {
        let reshaper = DataReshaper::new();
        let long = reshaper.melt(&wide)?;
        let pivot = reshaper.pivot(&long);

        info!(
            long_records = long.len(),
            pivot_rows = pivot.len(),
            "Reshaped dataset"
        );
        Ok(Self { wide, long, pivot })
    }

    pub fn cities(&self) -> &[String] {
        &self.wide.cities
    }

    pub fn has_city(&self, city: &str) -> bool {
        self.wide.cities.iter().any(|c| c == city)
    }

    /// Measurement types in first-seen order
    pub fn measurement_types(&self) -> Vec<String> {
        self.wide.measurement_types()
    }

    pub fn wide(&self) -> &WideTable {
        &self.wide
    }

    pub fn long(&self) -> &[LongRecord] {
        &self.long
    }

    pub fn pivot(&self) -> &PivotTable {
        &self.pivot
    }

    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.long.iter().map(|r| r.timestamp).min()?;
        let last = self.long.iter().map(|r| r.timestamp).max()?;
        Some((first, last))
    }

    pub fn info(&self) -> DatasetInfo {
        let range = self.time_range();
        DatasetInfo {
            wide_rows: self.wide.rows.len(),
            long_records: self.long.len(),
            pivot_rows: self.pivot.len(),
            cities: self.wide.cities.clone(),
            measurement_types: self.measurement_types(),
            first_timestamp: range.map(|r| r.0),
            last_timestamp: range.map(|r| r.1),
            missing_cells: self.long.iter().filter(|r| r.value.is_none()).count(),
        }
    }

    pub fn summary(&self) -> String {
        self.info().summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WideRow;

    #[test]
    fn test_from_table_builds_all_shapes() {
        let table = WideTable::new(
            vec!["北京".into(), "上海".into()],
            vec![
                WideRow::new("20251206", "0", "AQI", vec![Some(80.0), None]),
                WideRow::new("20251206", "1", "AQI", vec![Some(90.0), Some(40.0)]),
            ],
        );
        let dataset = Dataset::from_table(table).unwrap();

        assert_eq!(dataset.long().len(), 4);
        assert_eq!(dataset.pivot().len(), 3);
        assert!(dataset.has_city("上海"));
        assert!(!dataset.has_city("广州"));
        let (first, last) = dataset.time_range().unwrap();
        assert_eq!((last - first).num_hours(), 1);
        assert!(dataset.summary().contains("Missing cells: 1 (25.0%)"));
    }
}
