use crate::error::{AnalysisError, Result};
use crate::models::{CityFeatureVector, ClusterAssignment, ClusterLabel, PivotTable};
use crate::processors::feature_aggregator::FeatureAggregator;
use crate::processors::kmeans::KMeans;
use crate::processors::labeler::ClusterLabeler;
use crate::processors::standardizer::Standardizer;
use crate::settings::{KMeansSettings, LabelThresholds};
use crate::utils::constants::{MAX_CLUSTERS, MIN_CLUSTERS};
use serde::Serialize;
use ndarray::Array2;
use std::collections::BTreeMap;
use tracing::info;

/// Output of one clustering pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteringResult {
    pub n_clusters: usize,
    /// Resolved feature columns, in matrix order
    pub features: Vec<String>,
    /// Per-city means in original units, sorted by city
    pub city_features: Vec<CityFeatureVector>,
    pub assignments: Vec<ClusterAssignment>,
    /// One entry per non-empty cluster, ordered by cluster id
    pub labels: Vec<ClusterLabel>,
    pub excluded_cities: Vec<String>,
    pub inertia: f64,
}

impl ClusteringResult {
    pub fn cluster_of(&self, city: &str) -> Option<usize> {
        self.assignments
            .iter()
            .find(|a| a.city == city)
            .map(|a| a.cluster_id)
    }

    pub fn label_of(&self, cluster_id: usize) -> Option<&ClusterLabel> {
        self.labels.iter().find(|l| l.cluster_id == cluster_id)
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Clustered {} cities into {} groups on [{}] (inertia {:.3})",
            self.assignments.len(),
            self.n_clusters,
            self.features.join(", "),
            self.inertia
        )];
        for label in &self.labels {
            let centroid = label
                .centroid
                .iter()
                .map(|(k, v)| format!("{}={:.1}", k, v))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!(
                "  #{} {} ({} cities): {}",
                label.cluster_id,
                label.name(),
                label.members.len(),
                centroid
            ));
        }
        if !self.excluded_cities.is_empty() {
            lines.push(format!(
                "Excluded (missing features): {}",
                self.excluded_cities.join(", ")
            ));
        }
        lines.join("\n")
    }
}

/// Aggregate → standardize → K-Means → centroid → label
pub struct ClusterPipeline {
    kmeans: KMeansSettings,
    labeler: ClusterLabeler,
    aggregator: FeatureAggregator,
}

impl ClusterPipeline {
    pub fn new(kmeans: KMeansSettings, thresholds: LabelThresholds) -> Self {
        Self {
            kmeans,
            labeler: ClusterLabeler::new(thresholds),
            aggregator: FeatureAggregator::new(),
        }
    }

    pub fn default_features(&self) -> &[String] {
        &self.kmeans.features
    }

    /// Run on the pivot without modifying it
    pub fn run(
        &self,
        pivot: &PivotTable,
        requested_features: &[String],
        n_clusters: usize,
    ) -> Result<ClusteringResult> {
        if !(MIN_CLUSTERS..=MAX_CLUSTERS).contains(&n_clusters) {
            return Err(AnalysisError::InvalidParameter(format!(
                "K must be between {} and {}, got {}",
                MIN_CLUSTERS, MAX_CLUSTERS, n_clusters
            )));
        }

        let features = self.aggregator.resolve_features(pivot, requested_features)?;
        let aggregated = self.aggregator.aggregate(pivot, &features)?;

        let cities = &aggregated.cities;
        let matrix = Array2::from_shape_fn((cities.len(), features.len()), |(row, col)| {
            cities[row].values[col]
        });
        let (_, scaled) = Standardizer::fit_transform(&matrix);

        let fit = KMeans::new(n_clusters)
            .with_seed(self.kmeans.seed)
            .with_restarts(self.kmeans.restarts)
            .with_max_iterations(self.kmeans.max_iterations)
            .with_tolerance(self.kmeans.tolerance)
            .fit(&scaled)?;

        let assignments: Vec<ClusterAssignment> = aggregated
            .cities
            .iter()
            .zip(&fit.labels)
            .map(|(c, &cluster_id)| ClusterAssignment {
                city: c.city.clone(),
                cluster_id,
            })
            .collect();

        let labels = self.label_clusters(&features, &aggregated.cities, &fit.labels, n_clusters);

        info!(
            cities = assignments.len(),
            excluded = aggregated.excluded.len(),
            k = n_clusters,
            "Clustered cities by pollution profile"
        );

        Ok(ClusteringResult {
            n_clusters,
            features,
            city_features: aggregated.cities,
            assignments,
            labels,
            excluded_cities: aggregated.excluded,
            inertia: fit.inertia,
        })
    }

    /// Centroids in original units over member cities, then named by rule
    fn label_clusters(
        &self,
        features: &[String],
        cities: &[CityFeatureVector],
        assignments: &[usize],
        n_clusters: usize,
    ) -> Vec<ClusterLabel> {
        let mut labels = Vec::with_capacity(n_clusters);

        for cluster_id in 0..n_clusters {
            let members: Vec<&CityFeatureVector> = cities
                .iter()
                .zip(assignments)
                .filter(|(_, a)| **a == cluster_id)
                .map(|(c, _)| c)
                .collect();
            if members.is_empty() {
                continue;
            }

            let centroid: BTreeMap<String, f64> = features
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let mean =
                        members.iter().map(|m| m.values[i]).sum::<f64>() / members.len() as f64;
                    (name.clone(), mean)
                })
                .collect();

            labels.push(ClusterLabel {
                cluster_id,
                category: self.labeler.label(&centroid),
                centroid,
                members: members.iter().map(|m| m.city.clone()).collect(),
            });
        }
        labels
    }
}

impl Default for ClusterPipeline {
    fn default() -> Self {
        Self::new(KMeansSettings::default(), LabelThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClusterCategory, PivotRecord};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const FEATURES: [&str; 6] = ["AQI", "PM2.5", "PM10", "CO", "NO2", "SO2"];

    fn city_rows(city: &str, base: [f64; 6], hours: u32) -> Vec<PivotRecord> {
        (0..hours)
            .map(|h| {
                let ts = NaiveDate::from_ymd_opt(2025, 12, 6)
                    .unwrap()
                    .and_hms_opt(h, 0, 0)
                    .unwrap();
                let mut r = PivotRecord::new(ts, city.to_string());
                for (name, v) in FEATURES.iter().zip(base) {
                    r.values.insert(name.to_string(), v + h as f64 * 0.1);
                }
                r
            })
            .collect()
    }

    fn sample_pivot() -> PivotTable {
        let mut records = Vec::new();
        records.extend(city_rows("三亚", [25.0, 10.0, 20.0, 0.4, 10.0, 4.0], 4));
        records.extend(city_rows("海口", [28.0, 12.0, 24.0, 0.5, 12.0, 5.0], 4));
        records.extend(city_rows("喀什地区", [240.0, 70.0, 320.0, 0.9, 20.0, 8.0], 4));
        records.extend(city_rows("和田地区", [260.0, 75.0, 350.0, 1.0, 22.0, 9.0], 4));
        records.extend(city_rows("唐山", [140.0, 100.0, 150.0, 1.6, 40.0, 35.0], 4));
        records.extend(city_rows("邯郸", [150.0, 105.0, 160.0, 1.7, 42.0, 38.0], 4));
        // 拉萨 reports no SO2 at all
        let mut lhasa = city_rows("拉萨", [30.0, 8.0, 25.0, 0.3, 8.0, 0.0], 4);
        lhasa.iter_mut().for_each(|r| {
            r.values.remove("SO2");
        });
        records.extend(lhasa);
        PivotTable::new(FEATURES.iter().map(|s| s.to_string()).collect(), records)
    }

    fn features() -> Vec<String> {
        FEATURES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pipeline_groups_and_labels() {
        let result = ClusterPipeline::default()
            .run(&sample_pivot(), &features(), 3)
            .unwrap();

        assert_eq!(result.assignments.len(), 6);
        assert_eq!(result.cluster_of("三亚"), result.cluster_of("海口"));
        assert_eq!(result.cluster_of("喀什地区"), result.cluster_of("和田地区"));
        assert_eq!(result.cluster_of("唐山"), result.cluster_of("邯郸"));
        assert_ne!(result.cluster_of("三亚"), result.cluster_of("唐山"));

        let category = |city: &str| {
            let id = result.cluster_of(city).unwrap();
            result.label_of(id).unwrap().category
        };
        assert_eq!(category("三亚"), ClusterCategory::Pristine);
        assert_eq!(category("喀什地区"), ClusterCategory::SevereDustStorm);
        assert_eq!(category("唐山"), ClusterCategory::HeavyIndustrial);
    }

    #[test]
    fn test_missing_feature_city_excluded_everywhere() {
        let result = ClusterPipeline::default()
            .run(&sample_pivot(), &features(), 3)
            .unwrap();

        assert_eq!(result.excluded_cities, vec!["拉萨"]);
        assert!(result.cluster_of("拉萨").is_none());
        assert!(result.city_features.iter().all(|c| c.city != "拉萨"));
        assert!(result
            .labels
            .iter()
            .all(|l| !l.members.contains(&"拉萨".to_string())));
    }

    #[test]
    fn test_deterministic_across_runs() {
        let pivot = sample_pivot();
        let pipeline = ClusterPipeline::default();
        let a = pipeline.run(&pivot, &features(), 4).unwrap();
        let b = pipeline.run(&pivot, &features(), 4).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a, b);
    }

    #[test]
    fn test_centroids_in_original_units() {
        let result = ClusterPipeline::default()
            .run(&sample_pivot(), &features(), 3)
            .unwrap();
        let id = result.cluster_of("三亚").unwrap();
        let centroid = &result.label_of(id).unwrap().centroid;
        // Mean of 三亚 (25.15) and 海口 (28.15)
        assert!((centroid["AQI"] - 26.65).abs() < 1e-9);
    }

    #[test]
    fn test_two_features_halts_before_clustering() {
        let pivot = sample_pivot();
        let requested = vec!["AQI".to_string(), "PM10".to_string(), "VOC".to_string()];
        let err = ClusterPipeline::default()
            .run(&pivot, &requested, 3)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration { .. }));
    }

    #[test]
    fn test_k_out_of_range() {
        let err = ClusterPipeline::default()
            .run(&sample_pivot(), &features(), 9)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameter(_)));
    }

    #[test]
    fn test_input_pivot_untouched() {
        let pivot = sample_pivot();
        let before = pivot.records.clone();
        ClusterPipeline::default()
            .run(&pivot, &features(), 2)
            .unwrap();
        assert_eq!(pivot.records, before);
    }
}
