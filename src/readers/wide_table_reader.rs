use crate::error::{AnalysisError, Result};
use crate::models::{WideRow, WideTable};
use crate::utils::constants::{
    DATE_COLUMN, DEFAULT_BUFFER_SIZE, DERIVED_DATETIME_COLUMN, HOUR_COLUMN, MISSING_TOKENS,
    TYPE_COLUMN,
};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

pub struct WideTableReader {
    delimiter: u8,
}

impl WideTableReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read the wide table from disk. Any failure here is a load error.
    pub fn read_table(&self, path: &Path) -> Result<WideTable> {
        let file = File::open(path).map_err(|e| {
            AnalysisError::Load(format!("Cannot open '{}': {}", path.display(), e))
        })?;
        let mut bytes = Vec::new();
        BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file).read_to_end(&mut bytes)?;

        let text = decode_input(&bytes)?;
        let table = self.parse_table(&text)?;

        info!(
            path = %path.display(),
            rows = table.rows.len(),
            cities = table.cities.len(),
            "Loaded wide air-quality table"
        );
        Ok(table)
    }

    /// Parse already-decoded delimited text
    pub fn parse_table(&self, text: &str) -> Result<WideTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let column_index = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                AnalysisError::Load(format!("Missing required column '{}'", name))
            })
        };
        let date_idx = column_index(DATE_COLUMN)?;
        let hour_idx = column_index(HOUR_COLUMN)?;
        let type_idx = column_index(TYPE_COLUMN)?;

        let city_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| {
                *i != date_idx
                    && *i != hour_idx
                    && *i != type_idx
                    && *h != DERIVED_DATETIME_COLUMN
                    && !h.is_empty()
            })
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        debug!(cities = city_columns.len(), "Resolved city columns");

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            // Header is line 1
            let line = line + 2;

            let field = |idx: usize| record.get(idx).unwrap_or("");
            let measurement_type = field(type_idx);
            if measurement_type.is_empty() {
                return Err(AnalysisError::Load(format!(
                    "Line {}: empty measurement type",
                    line
                )));
            }

            let mut values = Vec::with_capacity(city_columns.len());
            for (idx, city) in &city_columns {
                values.push(parse_cell(field(*idx)).map_err(|raw| {
                    AnalysisError::Load(format!(
                        "Line {}: non-numeric value '{}' for city '{}'",
                        line, raw, city
                    ))
                })?);
            }

            let row = WideRow::new(field(date_idx), field(hour_idx), measurement_type, values);
            // Surface malformed timestamps at load time, not mid-reshape
            row.timestamp()?;
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(AnalysisError::Load("Input table has no data rows".to_string()));
        }

        let cities = city_columns.into_iter().map(|(_, name)| name).collect();
        Ok(WideTable::new(cities, rows))
    }
}

impl Default for WideTableReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode UTF-8 (BOM stripped), falling back to GB18030 for GBK exports.
fn decode_input(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if !had_errors {
        return Ok(text);
    }

    debug!("Input is not valid UTF-8, retrying as GB18030");
    let (text, _, had_errors) = encoding_rs::GB18030.decode(bytes);
    if had_errors {
        return Err(AnalysisError::Load(
            "Input is neither UTF-8 nor GB18030 text".to_string(),
        ));
    }
    Ok(text)
}

/// Missing tokens map to `None`; anything else must be a number.
/// Non-finite numbers (`NaN`, `inf`) count as missing.
fn parse_cell(raw: &str) -> std::result::Result<Option<f64>, String> {
    if MISSING_TOKENS.contains(&raw) {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if !v.is_finite() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(raw.to_string()),
    }
}
