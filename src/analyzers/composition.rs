use crate::error::{AnalysisError, Result};
use crate::models::{PivotTable, Pollutant};
use crate::utils::constants::COMPOSITION_REFERENCE_MAX;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionPoint {
    pub city: String,
    pub timestamp: NaiveDateTime,
    pub pm10: f64,
    pub pm25: f64,
    /// Colour channel; may be unavailable for a row
    pub aqi: Option<f64>,
}

/// PM10 vs PM2.5 scatter data with the x = y guide line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticulateComposition {
    pub points: Vec<CompositionPoint>,
    pub reference_line: ((f64, f64), (f64, f64)),
}

impl ParticulateComposition {
    /// Share of points where coarse particles dominate (PM10 > 2 x PM2.5)
    pub fn coarse_dominated_share(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let coarse = self.points.iter().filter(|p| p.pm10 > 2.0 * p.pm25).count();
        coarse as f64 / self.points.len() as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "PM10 vs PM2.5: {} points, {:.1}% coarse-dominated",
            self.points.len(),
            self.coarse_dominated_share() * 100.0
        )
    }
}

pub struct CompositionAnalyzer;

impl CompositionAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn scatter(&self, pivot: &PivotTable) -> Result<ParticulateComposition> {
        let pm10_col = Pollutant::Pm10.type_name();
        let pm25_col = Pollutant::Pm25.type_name();
        for column in [pm10_col, pm25_col] {
            if !pivot.has_column(column) {
                return Err(AnalysisError::MissingColumn(column.to_string()));
            }
        }

        let points = pivot
            .records
            .iter()
            .filter_map(|r| {
                Some(CompositionPoint {
                    city: r.city.clone(),
                    timestamp: r.timestamp,
                    pm10: r.get(pm10_col)?,
                    pm25: r.get(pm25_col)?,
                    aqi: r.get(Pollutant::Aqi.type_name()),
                })
            })
            .collect();

        Ok(ParticulateComposition {
            points,
            reference_line: ((0.0, 0.0), (COMPOSITION_REFERENCE_MAX, COMPOSITION_REFERENCE_MAX)),
        })
    }
}

impl Default for CompositionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PivotRecord;
    use chrono::NaiveDate;

    fn row(hour: u32, city: &str, values: &[(&str, f64)]) -> PivotRecord {
        let ts = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap().and_hms_opt(hour, 0, 0).unwrap();
        let mut r = PivotRecord::new(ts, city.into());
        for (k, v) in values {
            r.values.insert(k.to_string(), *v);
        }
        r
    }

    #[test]
    fn test_points_need_both_particulates() {
        let pivot = PivotTable::new(
            vec!["AQI".into(), "PM10".into(), "PM2.5".into()],
            vec![
                row(0, "喀什地区", &[("PM10", 400.0), ("PM2.5", 90.0), ("AQI", 300.0)]),
                row(0, "上海", &[("PM10", 50.0), ("PM2.5", 35.0)]),
                row(1, "上海", &[("PM10", 55.0)]),
            ],
        );
        let scatter = CompositionAnalyzer::new().scatter(&pivot).unwrap();
        assert_eq!(scatter.points.len(), 2);
        assert_eq!(scatter.points[1].aqi, None);
        assert_eq!(scatter.coarse_dominated_share(), 0.5);
        assert_eq!(scatter.reference_line.1, (500.0, 500.0));
    }

    #[test]
    fn test_missing_column_is_soft() {
        let pivot = PivotTable::new(vec!["AQI".into(), "PM10".into()], vec![]);
        let err = CompositionAnalyzer::new().scatter(&pivot).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn(ref c) if c == "PM2.5"));
    }
}
