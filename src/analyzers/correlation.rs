use crate::error::{AnalysisError, Result};
use crate::models::PivotTable;
use crate::utils::constants::CORRELATION_COLUMNS;
use serde::Serialize;

/// Square feature x feature matrix; `NaN` where a pair has too little overlap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{:>8}{}",
            "",
            self.columns
                .iter()
                .map(|c| format!("{:>8}", c))
                .collect::<String>()
        )];
        for (name, row) in self.columns.iter().zip(&self.values) {
            let cells: String = row.iter().map(|v| format!("{:>8.2}", v)).collect();
            lines.push(format!("{:>8}{}", name, cells));
        }
        lines.join("\n")
    }
}

pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Pearson correlation over the standard pollutant columns present.
    /// Fewer than two such columns is a soft missing-column condition.
    pub fn correlate(&self, pivot: &PivotTable) -> Result<CorrelationMatrix> {
        let columns: Vec<String> = CORRELATION_COLUMNS
            .iter()
            .filter(|c| pivot.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if columns.len() < 2 {
            return Err(AnalysisError::MissingColumn(format!(
                "need two of {}",
                CORRELATION_COLUMNS.join(", ")
            )));
        }

        let series: Vec<Vec<Option<f64>>> =
            columns.iter().map(|c| pivot.column_values(c)).collect();
        let values = (0..columns.len())
            .map(|i| {
                (0..columns.len())
                    .map(|j| pearson_pairwise(&series[i], &series[j]))
                    .collect()
            })
            .collect();

        Ok(CorrelationMatrix { columns, values })
    }
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pearson r over rows where both values exist
pub fn pearson_pairwise(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PivotRecord;
    use chrono::NaiveDate;

    fn pivot(rows: &[(f64, Option<f64>, f64)]) -> PivotTable {
        let records = rows
            .iter()
            .enumerate()
            .map(|(h, (aqi, pm25, o3))| {
                let ts = NaiveDate::from_ymd_opt(2025, 12, 6)
                    .unwrap()
                    .and_hms_opt(h as u32, 0, 0)
                    .unwrap();
                let mut r = PivotRecord::new(ts, "北京".into());
                r.values.insert("AQI".into(), *aqi);
                if let Some(v) = pm25 {
                    r.values.insert("PM2.5".into(), *v);
                }
                r.values.insert("O3".into(), *o3);
                r
            })
            .collect();
        PivotTable::new(vec!["O3".into(), "AQI".into(), "PM2.5".into()], records)
    }

    #[test]
    fn test_matrix_order_and_values() {
        let table = pivot(&[
            (50.0, Some(25.0), 90.0),
            (100.0, Some(50.0), 60.0),
            (150.0, None, 30.0),
            (200.0, Some(100.0), 0.0),
        ]);
        let matrix = CorrelationAnalyzer::new().correlate(&table).unwrap();

        assert_eq!(matrix.columns, vec!["AQI", "PM2.5", "O3"]);
        assert!((matrix.get("AQI", "AQI").unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get("AQI", "PM2.5").unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get("AQI", "O3").unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(matrix.get("O3", "AQI"), matrix.get("AQI", "O3"));
    }

    #[test]
    fn test_single_column_is_soft_omission() {
        let table = PivotTable::new(vec!["AQI".into(), "PM2.5_24h".into()], vec![]);
        let err = CorrelationAnalyzer::new().correlate(&table).unwrap_err();
        assert!(err.is_soft());
    }

    #[test]
    fn test_constant_series_is_nan() {
        let r = pearson_pairwise(&[Some(1.0), Some(1.0)], &[Some(2.0), Some(3.0)]);
        assert!(r.is_nan());
    }
}
