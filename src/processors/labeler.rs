use crate::models::pollutant::normalize_type_name;
use crate::models::{ClusterCategory, Pollutant};
use crate::settings::LabelThresholds;
use std::collections::BTreeMap;

/// Read-only view of an original-unit centroid keyed by feature name.
/// A feature the pipeline did not cluster on reads as `None`.
pub struct CentroidView<'a> {
    values: &'a BTreeMap<String, f64>,
}

impl<'a> CentroidView<'a> {
    pub fn new(values: &'a BTreeMap<String, f64>) -> Self {
        Self { values }
    }

    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        if let Some(v) = self.values.get(pollutant.type_name()) {
            return Some(*v);
        }
        let key = normalize_type_name(pollutant.type_name());
        self.values
            .iter()
            .find(|(name, _)| normalize_type_name(name) == key)
            .map(|(_, v)| *v)
    }

    /// PM10 / (PM2.5 + guard); coarse-dominated dust pushes this up
    fn coarse_ratio(&self, guard: f64) -> Option<f64> {
        Some(self.get(Pollutant::Pm10)? / (self.get(Pollutant::Pm25)? + guard))
    }
}

type Predicate = fn(&CentroidView<'_>, &LabelThresholds) -> bool;

/// One entry of the ordered decision table
pub struct LabelRule {
    pub category: ClusterCategory,
    predicate: Predicate,
}

impl LabelRule {
    pub fn matches(&self, centroid: &CentroidView<'_>, thresholds: &LabelThresholds) -> bool {
        (self.predicate)(centroid, thresholds)
    }
}

fn below(value: Option<f64>, limit: f64) -> bool {
    value.is_some_and(|v| v < limit)
}

fn above(value: Option<f64>, limit: f64) -> bool {
    value.is_some_and(|v| v > limit)
}

/// Evaluated top to bottom; the first matching rule names the cluster.
/// The list ends with a catch-all, so every centroid gets a category.
pub const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        category: ClusterCategory::Pristine,
        predicate: |c, t| below(c.get(Pollutant::Aqi), t.pristine_aqi),
    },
    LabelRule {
        category: ClusterCategory::SevereDustStorm,
        predicate: |c, t| {
            above(c.get(Pollutant::Pm10), t.severe_dust_pm10)
                && above(c.coarse_ratio(t.dust_ratio_guard), t.severe_dust_ratio)
        },
    },
    LabelRule {
        category: ClusterCategory::FloatingDust,
        predicate: |c, t| {
            above(c.get(Pollutant::Pm10), t.floating_dust_pm10)
                && above(c.coarse_ratio(t.dust_ratio_guard), t.floating_dust_ratio)
        },
    },
    LabelRule {
        category: ClusterCategory::HeavyIndustrial,
        predicate: |c, t| above(c.get(Pollutant::So2), t.heavy_industry_so2),
    },
    LabelRule {
        category: ClusterCategory::LightIndustrialHeating,
        predicate: |c, t| {
            above(c.get(Pollutant::So2), t.light_industry_so2)
                && above(c.get(Pollutant::Co), t.light_industry_co)
        },
    },
    LabelRule {
        category: ClusterCategory::TrafficCongestion,
        predicate: |c, t| above(c.get(Pollutant::No2), t.traffic_no2),
    },
    LabelRule {
        category: ClusterCategory::SevereComposite,
        predicate: |c, t| above(c.get(Pollutant::Aqi), t.severe_composite_aqi),
    },
    LabelRule {
        category: ClusterCategory::HeavyHaze,
        predicate: |c, t| above(c.get(Pollutant::Aqi), t.heavy_haze_aqi),
    },
    LabelRule {
        category: ClusterCategory::LightHaze,
        predicate: |c, t| above(c.get(Pollutant::Aqi), t.light_haze_aqi),
    },
    LabelRule {
        category: ClusterCategory::CleanLiveable,
        predicate: |c, t| below(c.get(Pollutant::Aqi), t.clean_liveable_aqi),
    },
    LabelRule {
        category: ClusterCategory::Transitional,
        predicate: |_, _| true,
    },
];

/// Names clusters from their centroids with the ordered rule table.
pub struct ClusterLabeler {
    thresholds: LabelThresholds,
}

impl ClusterLabeler {
    pub fn new(thresholds: LabelThresholds) -> Self {
        Self { thresholds }
    }

    /// First matching rule wins
    pub fn label(&self, centroid: &BTreeMap<String, f64>) -> ClusterCategory {
        let view = CentroidView::new(centroid);
        LABEL_RULES
            .iter()
            .find(|rule| rule.matches(&view, &self.thresholds))
            .map_or(ClusterCategory::Transitional, |rule| rule.category)
    }
}

impl Default for ClusterLabeler {
    fn default() -> Self {
        Self::new(LabelThresholds::default())
    }
}
