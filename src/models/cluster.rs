use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Time-averaged features of one city, aligned with the pipeline's feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityFeatureVector {
    pub city: String,
    pub values: Vec<f64>,
}

impl CityFeatureVector {
    pub fn new(city: String, values: Vec<f64>) -> Self {
        Self { city, values }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub city: String,
    pub cluster_id: usize,
}

/// Pollution-profile categories, listed in rule order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterCategory {
    Pristine,
    SevereDustStorm,
    FloatingDust,
    HeavyIndustrial,
    LightIndustrialHeating,
    TrafficCongestion,
    SevereComposite,
    HeavyHaze,
    LightHaze,
    CleanLiveable,
    Transitional,
}

/// Coarse grouping used for colouring cluster views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryFamily {
    Clean,
    Dust,
    Industrial,
    Traffic,
    Haze,
    Mixed,
}

impl ClusterCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ClusterCategory::Pristine => "Pristine ecology",
            ClusterCategory::SevereDustStorm => "Severe dust storm",
            ClusterCategory::FloatingDust => "Floating dust",
            ClusterCategory::HeavyIndustrial => "Heavy industrial / coal",
            ClusterCategory::LightIndustrialHeating => "Light industrial / heating",
            ClusterCategory::TrafficCongestion => "Traffic congestion",
            ClusterCategory::SevereComposite => "Severe composite pollution",
            ClusterCategory::HeavyHaze => "Heavy haze",
            ClusterCategory::LightHaze => "Light haze",
            ClusterCategory::CleanLiveable => "Clean & liveable",
            ClusterCategory::Transitional => "Transitional / mixed",
        }
    }

    pub fn family(&self) -> CategoryFamily {
        match self {
            ClusterCategory::Pristine | ClusterCategory::CleanLiveable => CategoryFamily::Clean,
            ClusterCategory::SevereDustStorm | ClusterCategory::FloatingDust => {
                CategoryFamily::Dust
            }
            ClusterCategory::HeavyIndustrial | ClusterCategory::LightIndustrialHeating => {
                CategoryFamily::Industrial
            }
            ClusterCategory::TrafficCongestion => CategoryFamily::Traffic,
            ClusterCategory::SevereComposite
            | ClusterCategory::HeavyHaze
            | ClusterCategory::LightHaze => CategoryFamily::Haze,
            ClusterCategory::Transitional => CategoryFamily::Mixed,
        }
    }
}

impl CategoryFamily {
    /// Hex colour hint for the rendering layer
    pub fn accent_color(&self) -> &'static str {
        match self {
            CategoryFamily::Clean => "#00CC96",
            CategoryFamily::Dust => "#FFA15A",
            CategoryFamily::Industrial => "#EF553B",
            CategoryFamily::Traffic => "#AB63FA",
            CategoryFamily::Haze | CategoryFamily::Mixed => "#636EFA",
        }
    }
}

impl std::fmt::Display for ClusterCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Cluster summary in original units. Labels are derived post hoc from the
/// centroid and may repeat across clusters or change when K or the feature
/// set changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterLabel {
    pub cluster_id: usize,
    pub category: ClusterCategory,
    /// Feature name -> mean over member cities
    pub centroid: BTreeMap<String, f64>,
    pub members: Vec<String>,
}

impl ClusterLabel {
    pub fn name(&self) -> &'static str {
        self.category.display_name()
    }
}
