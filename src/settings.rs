use crate::error::Result;
use crate::utils::constants::*;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

/// Tunable policy for every stage. Defaults come from `utils::constants`; a
/// TOML file and `AQI_*` environment variables may override any field, e.g.
/// `AQI_LABELS__TRAFFIC_NO2=40`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnalysisSettings {
    #[validate(nested)]
    pub advisory: AdvisoryThresholds,
    #[validate(nested)]
    pub labels: LabelThresholds,
    #[validate(nested)]
    pub kmeans: KMeansSettings,
    #[validate(nested)]
    pub panels: PanelSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AdvisoryThresholds {
    pub moderate_aqi: f64,
    pub sensitive_aqi: f64,
    pub unhealthy_aqi: f64,
    pub very_unhealthy_aqi: f64,
    pub hazardous_aqi: f64,
    pub dust_pm10: f64,
    #[validate(range(min = 0.0))]
    pub dust_ratio: f64,
    #[validate(range(min = 0.0))]
    pub dust_guard: f64,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            moderate_aqi: ADVISORY_MODERATE_AQI,
            sensitive_aqi: ADVISORY_SENSITIVE_AQI,
            unhealthy_aqi: ADVISORY_UNHEALTHY_AQI,
            very_unhealthy_aqi: ADVISORY_VERY_UNHEALTHY_AQI,
            hazardous_aqi: ADVISORY_HAZARDOUS_AQI,
            dust_pm10: ADVISORY_DUST_PM10,
            dust_ratio: ADVISORY_DUST_RATIO,
            dust_guard: ADVISORY_DUST_GUARD,
        }
    }
}

/// Cut-offs for the ordered cluster-labeling rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LabelThresholds {
    pub pristine_aqi: f64,
    pub severe_dust_pm10: f64,
    pub severe_dust_ratio: f64,
    pub floating_dust_pm10: f64,
    pub floating_dust_ratio: f64,
    #[validate(range(min = 0.0))]
    pub dust_ratio_guard: f64,
    pub heavy_industry_so2: f64,
    pub light_industry_so2: f64,
    pub light_industry_co: f64,
    pub traffic_no2: f64,
    pub severe_composite_aqi: f64,
    pub heavy_haze_aqi: f64,
    pub light_haze_aqi: f64,
    pub clean_liveable_aqi: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            pristine_aqi: LABEL_PRISTINE_AQI,
            severe_dust_pm10: LABEL_SEVERE_DUST_PM10,
            severe_dust_ratio: LABEL_SEVERE_DUST_RATIO,
            floating_dust_pm10: LABEL_FLOATING_DUST_PM10,
            floating_dust_ratio: LABEL_FLOATING_DUST_RATIO,
            dust_ratio_guard: LABEL_DUST_RATIO_GUARD,
            heavy_industry_so2: LABEL_HEAVY_INDUSTRY_SO2,
            light_industry_so2: LABEL_LIGHT_INDUSTRY_SO2,
            light_industry_co: LABEL_LIGHT_INDUSTRY_CO,
            traffic_no2: LABEL_TRAFFIC_NO2,
            severe_composite_aqi: LABEL_SEVERE_COMPOSITE_AQI,
            heavy_haze_aqi: LABEL_HEAVY_HAZE_AQI,
            light_haze_aqi: LABEL_LIGHT_HAZE_AQI,
            clean_liveable_aqi: LABEL_CLEAN_LIVEABLE_AQI,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct KMeansSettings {
    #[validate(range(min = 2, max = 8))]
    pub default_clusters: usize,
    pub seed: u64,
    #[validate(range(min = 1))]
    pub restarts: usize,
    #[validate(range(min = 1))]
    pub max_iterations: usize,
    #[validate(range(min = 0.0))]
    pub tolerance: f64,
    #[validate(length(min = 3))]
    pub features: Vec<String>,
}

impl Default for KMeansSettings {
    fn default() -> Self {
        Self {
            default_clusters: DEFAULT_CLUSTERS,
            seed: KMEANS_SEED,
            restarts: KMEANS_RESTARTS,
            max_iterations: KMEANS_MAX_ITERATIONS,
            tolerance: KMEANS_TOLERANCE,
            features: DEFAULT_CLUSTER_FEATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PanelSettings {
    #[validate(range(min = 1))]
    pub ranking_size: usize,
    #[validate(range(min = 1))]
    pub representative_cities: usize,
    pub priority_cities: Vec<String>,
    pub trend_cities: Vec<String>,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            ranking_size: DEFAULT_RANKING_SIZE,
            representative_cities: REPRESENTATIVE_CITY_COUNT,
            priority_cities: PRIORITY_CITIES.iter().map(|s| s.to_string()).collect(),
            trend_cities: DEFAULT_TREND_CITIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AnalysisSettings {
    /// Layer defaults, an optional settings file and `AQI_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "Reading settings file");
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(SETTINGS_ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: AnalysisSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
