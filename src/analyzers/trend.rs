use crate::error::{AnalysisError, Result};
use crate::models::{describe_type, LongRecord};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub city: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub measurement_type: String,
    pub cities: Vec<String>,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} trend for {} ({} points)",
            describe_type(&self.measurement_type),
            self.cities.join(", "),
            self.points.len()
        )];
        for city in &self.cities {
            let values: Vec<f64> = self
                .points
                .iter()
                .filter(|p| &p.city == city)
                .map(|p| p.value)
                .collect();
            if values.is_empty() {
                lines.push(format!("  {}: no data", city));
                continue;
            }
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            lines.push(format!(
                "  {}: {} readings, min {:.1}, max {:.1}, last {:.1}",
                city,
                values.len(),
                min,
                max,
                values[values.len() - 1]
            ));
        }
        lines.join("\n")
    }
}

pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Non-missing values of one type for the selected cities, time-ordered
    pub fn series(
        &self,
        records: &[LongRecord],
        measurement_type: &str,
        cities: &[String],
    ) -> Result<TrendSeries> {
        if cities.is_empty() {
            return Err(AnalysisError::MissingData(
                "Select at least one city to compare".to_string(),
            ));
        }

        let mut points: Vec<TrendPoint> = records
            .iter()
            .filter(|r| r.measurement_type == measurement_type && cities.contains(&r.city))
            .filter_map(|r| {
                r.value.map(|value| TrendPoint {
                    timestamp: r.timestamp,
                    city: r.city.clone(),
                    value,
                })
            })
            .collect();
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.city.cmp(&b.city)));

        Ok(TrendSeries {
            measurement_type: measurement_type.to_string(),
            cities: cities.to_vec(),
            points,
        })
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
