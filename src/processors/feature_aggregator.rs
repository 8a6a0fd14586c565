use crate::error::{AnalysisError, Result};
use crate::models::{CityFeatureVector, PivotTable};
use crate::utils::constants::MIN_CLUSTER_FEATURES;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Per-city feature means for clustering.
pub struct FeatureAggregator {
    min_features: usize,
}

/// Cities that survived aggregation plus the ones dropped for missing features
#[derive(Debug, Clone)]
pub struct AggregatedFeatures {
    pub features: Vec<String>,
    pub cities: Vec<CityFeatureVector>,
    pub excluded: Vec<String>,
}

impl FeatureAggregator {
    pub fn new() -> Self {
        Self {
            min_features: MIN_CLUSTER_FEATURES,
        }
    }

    pub fn with_min_features(min_features: usize) -> Self {
        Self { min_features }
    }

    /// Map requested names onto pivot columns. Unmatched names are skipped;
    /// too few matches is a configuration error naming what did match.
    pub fn resolve_features(&self, pivot: &PivotTable, requested: &[String]) -> Result<Vec<String>> {
        let mut matched: Vec<String> = Vec::new();
        for name in requested {
            match pivot.resolve_column(name) {
                Some(column) if !matched.iter().any(|m| m == column) => {
                    matched.push(column.to_string())
                }
                Some(_) => {}
                None => debug!(feature = %name, "Requested feature not present"),
            }
        }

        if matched.len() < self.min_features {
            return Err(AnalysisError::Configuration {
                requested: requested.to_vec(),
                matched,
                minimum: self.min_features,
            });
        }
        Ok(matched)
    }

    /// Mean of each feature per city over all timestamps. Cities missing any
    /// feature entirely are dropped, never imputed.
    pub fn aggregate(&self, pivot: &PivotTable, features: &[String]) -> Result<AggregatedFeatures> {
        let mut sums: BTreeMap<&str, Vec<(f64, usize)>> = BTreeMap::new();

        for record in &pivot.records {
            let acc = sums
                .entry(record.city.as_str())
                .or_insert_with(|| vec![(0.0, 0); features.len()]);
            for (slot, feature) in acc.iter_mut().zip(features) {
                if let Some(value) = record.get(feature) {
                    slot.0 += value;
                    slot.1 += 1;
                }
            }
        }

        let mut cities = Vec::new();
        let mut excluded = Vec::new();
        for (city, acc) in sums {
            if acc.iter().any(|(_, count)| *count == 0) {
                excluded.push(city.to_string());
                continue;
            }
            let means = acc.iter().map(|(sum, count)| sum / *count as f64).collect();
            cities.push(CityFeatureVector::new(city.to_string(), means));
        }

        if !excluded.is_empty() {
            warn!(
                count = excluded.len(),
                "Cities excluded from clustering due to missing features"
            );
        }

        if cities.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "No city has values for every clustering feature".to_string(),
            ));
        }

        Ok(AggregatedFeatures {
            features: features.to_vec(),
            cities,
            excluded,
        })
    }
}

impl Default for FeatureAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PivotRecord;
    use chrono::NaiveDate;

    fn record(hour: u32, city: &str, values: &[(&str, f64)]) -> PivotRecord {
        let ts = NaiveDate::from_ymd_opt(2025, 12, 6)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        let mut r = PivotRecord::new(ts, city.to_string());
        for (k, v) in values {
            r.values.insert(k.to_string(), *v);
        }
        r
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_features_with_variants() {
        let pivot = PivotTable::new(names(&["AQI", "PM2.5", "PM10", "O3"]), vec![]);
        let resolved = FeatureAggregator::new()
            .resolve_features(&pivot, &names(&["aqi", "pm2_5", "PM10", "SO2"]))
            .unwrap();
        assert_eq!(resolved, vec!["AQI", "PM2.5", "PM10"]);
    }

    #[test]
    fn test_two_features_is_configuration_error() {
        let pivot = PivotTable::new(names(&["AQI", "PM10"]), vec![]);
        let err = FeatureAggregator::new()
            .resolve_features(&pivot, &names(&["AQI", "PM2.5", "PM10", "CO", "NO2", "SO2"]))
            .unwrap_err();
        match err {
            AnalysisError::Configuration { matched, .. } => {
                assert_eq!(matched, vec!["AQI", "PM10"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_aggregate_means_and_exclusion() {
        let pivot = PivotTable::new(
            names(&["AQI", "PM10"]),
            vec![
                record(0, "北京", &[("AQI", 100.0), ("PM10", 80.0)]),
                record(1, "北京", &[("AQI", 120.0)]),
                record(0, "三亚", &[("AQI", 20.0)]),
            ],
        );
        let agg = FeatureAggregator::with_min_features(2)
            .aggregate(&pivot, &names(&["AQI", "PM10"]))
            .unwrap();

        assert_eq!(agg.cities.len(), 1);
        assert_eq!(agg.cities[0].city, "北京");
        assert_eq!(agg.cities[0].values, vec![110.0, 80.0]);
        assert_eq!(agg.excluded, vec!["三亚"]);
    }

    #[test]
    fn test_aggregate_no_complete_city() {
        let pivot = PivotTable::new(
            names(&["AQI", "PM10"]),
            vec![record(0, "三亚", &[("AQI", 20.0)])],
        );
        let err = FeatureAggregator::new()
            .aggregate(&pivot, &names(&["AQI", "PM10"]))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }
}
