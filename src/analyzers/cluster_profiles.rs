use crate::models::{CategoryFamily, ClusterCategory};
use crate::processors::ClusteringResult;
use serde::Serialize;

/// Per-cluster data for the radar ("shape") and bar ("level") views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterProfile {
    pub cluster_id: usize,
    pub category: ClusterCategory,
    pub family: CategoryFamily,
    pub accent_color: &'static str,
    pub features: Vec<String>,
    /// Original-unit centroid, aligned with `features`
    pub centroid: Vec<f64>,
    /// Min-max scaled across clusters, aligned with `features`
    pub normalized: Vec<f64>,
    pub member_count: usize,
    pub representatives: Vec<String>,
}

pub struct ClusterProfileBuilder {
    priority_cities: Vec<String>,
    representatives: usize,
}

impl ClusterProfileBuilder {
    pub fn new(priority_cities: Vec<String>, representatives: usize) -> Self {
        Self {
            priority_cities,
            representatives,
        }
    }

    pub fn build(&self, result: &ClusteringResult) -> Vec<ClusterProfile> {
        let centroids: Vec<Vec<f64>> = result
            .labels
            .iter()
            .map(|label| {
                result
                    .features
                    .iter()
                    .map(|f| label.centroid.get(f).copied().unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();
        let normalized = min_max_normalize(&centroids);

        result
            .labels
            .iter()
            .zip(centroids)
            .zip(normalized)
            .map(|((label, centroid), normalized)| ClusterProfile {
                cluster_id: label.cluster_id,
                category: label.category,
                family: label.category.family(),
                accent_color: label.category.family().accent_color(),
                features: result.features.clone(),
                centroid,
                normalized,
                member_count: label.members.len(),
                representatives: self.representatives(&label.members),
            })
            .collect()
    }

    /// Well-known cities first, then the rest in member order
    pub fn representatives(&self, members: &[String]) -> Vec<String> {
        let (priority, rest): (Vec<&String>, Vec<&String>) = members
            .iter()
            .partition(|m| self.priority_cities.contains(*m));
        priority
            .into_iter()
            .chain(rest)
            .take(self.representatives)
            .cloned()
            .collect()
    }
}

/// Scale each column to [0, 1] across rows. Constant or undefined columns become 0.
pub fn min_max_normalize(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let width = rows.first().map_or(0, Vec::len);
    let mut out = vec![vec![0.0; width]; rows.len()];

    for col in 0..width {
        let (min, max) = rows
            .iter()
            .map(|r| r[col])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let span = max - min;
        for (row, scaled) in rows.iter().zip(out.iter_mut()) {
            let v = (row[col] - min) / span;
            scaled[col] = if v.is_finite() { v } else { 0.0 };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_normalize() {
        let rows = vec![vec![10.0, 5.0], vec![30.0, 5.0], vec![20.0, 5.0]];
        let scaled = min_max_normalize(&rows);
        assert_eq!(scaled[0], vec![0.0, 0.0]);
        assert_eq!(scaled[1], vec![1.0, 0.0]);
        assert_eq!(scaled[2], vec![0.5, 0.0]);
    }

    #[test]
    fn test_representatives_prefer_priority_cities() {
        let builder = ClusterProfileBuilder::new(vec!["北京".into(), "西安".into()], 3);
        let members: Vec<String> = ["保定", "西安", "廊坊", "北京", "沧州"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(builder.representatives(&members), vec!["西安", "北京", "保定"]);
    }
}
