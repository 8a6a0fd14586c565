use crate::analyzers::{
    AdvisoryEngine, CityAdvisory, CityRanking, ClusterProfile, ClusterProfileBuilder,
    CompositionAnalyzer, CorrelationAnalyzer, CorrelationMatrix, LevelAnalyzer,
    LevelDistribution, ParticulateComposition, RankingAnalyzer, RankingMode, TrendAnalyzer,
    TrendSeries,
};
use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use crate::processors::{ClusterPipeline, ClusteringResult};
use crate::settings::AnalysisSettings;
use serde::Serialize;
use tracing::warn;

/// Result of one panel. A panel that fails never takes the others down.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum PanelOutcome<T> {
    Ready(T),
    /// Soft condition (e.g. a column is absent); the panel hides itself
    Omitted(String),
    Failed(String),
}

impl<T> PanelOutcome<T> {
    pub fn from_result(panel: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => PanelOutcome::Ready(value),
            Err(e) if e.is_soft() => PanelOutcome::Omitted(e.to_string()),
            Err(e) => {
                warn!(panel, error = %e, "Panel failed");
                PanelOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PanelOutcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PanelOutcome::Ready(_))
    }
}

/// Control values supplied by the interactive layer
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardParams {
    /// Falls back to the first city column
    pub advisory_city: Option<String>,
    pub trend_cities: Vec<String>,
    /// Falls back to the first measurement type
    pub measurement_type: Option<String>,
    pub ranking_mode: RankingMode,
    pub n_clusters: usize,
    pub features: Vec<String>,
}

impl DashboardParams {
    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self {
            advisory_city: None,
            trend_cities: settings.panels.trend_cities.clone(),
            measurement_type: None,
            ranking_mode: RankingMode::Polluted,
            n_clusters: settings.kmeans.default_clusters,
            features: settings.kmeans.features.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterPanel {
    pub result: ClusteringResult,
    pub profiles: Vec<ClusterProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub advisory: PanelOutcome<CityAdvisory>,
    pub ranking: PanelOutcome<CityRanking>,
    pub trend: PanelOutcome<TrendSeries>,
    pub correlation: PanelOutcome<CorrelationMatrix>,
    pub composition: PanelOutcome<ParticulateComposition>,
    pub levels: PanelOutcome<LevelDistribution>,
    pub clusters: PanelOutcome<ClusterPanel>,
}

impl DashboardReport {
    pub fn summary(&self) -> String {
        fn section<T>(title: &str, outcome: &PanelOutcome<T>, body: impl Fn(&T) -> String) -> String {
            let content = match outcome {
                PanelOutcome::Ready(value) => body(value),
                PanelOutcome::Omitted(reason) => format!("(omitted: {})", reason),
                PanelOutcome::Failed(error) => format!("ERROR: {}", error),
            };
            format!("== {} ==\n{}", title, content)
        }

        [
            section("Health advisory", &self.advisory, CityAdvisory::summary),
            section("City ranking", &self.ranking, CityRanking::summary),
            section("Trend", &self.trend, TrendSeries::summary),
            section("Correlation", &self.correlation, CorrelationMatrix::summary),
            section("Particulate composition", &self.composition, ParticulateComposition::summary),
            section("AQI levels", &self.levels, LevelDistribution::summary),
            section("Pollution-profile clusters", &self.clusters, |panel| panel.result.summary()),
        ]
        .join("\n\n")
    }
}

/// Computes every panel from one immutable dataset
pub struct Dashboard<'a> {
    dataset: &'a Dataset,
    settings: &'a AnalysisSettings,
}

impl<'a> Dashboard<'a> {
    pub fn new(dataset: &'a Dataset, settings: &'a AnalysisSettings) -> Self {
        Self { dataset, settings }
    }

    pub fn build(&self, params: &DashboardParams) -> DashboardReport {
        let measurement_type = params
            .measurement_type
            .clone()
            .or_else(|| self.dataset.measurement_types().into_iter().next())
            .unwrap_or_default();

        DashboardReport {
            advisory: PanelOutcome::from_result("advisory", self.advisory(params)),
            ranking: PanelOutcome::from_result(
                "ranking",
                RankingAnalyzer::new(self.settings.panels.ranking_size).rank(
                    self.dataset.long(),
                    &measurement_type,
                    params.ranking_mode,
                ),
            ),
            trend: PanelOutcome::from_result(
                "trend",
                TrendAnalyzer::new().series(
                    self.dataset.long(),
                    &measurement_type,
                    &params.trend_cities,
                ),
            ),
            correlation: PanelOutcome::from_result(
                "correlation",
                CorrelationAnalyzer::new().correlate(self.dataset.pivot()),
            ),
            composition: PanelOutcome::from_result(
                "composition",
                CompositionAnalyzer::new().scatter(self.dataset.pivot()),
            ),
            levels: PanelOutcome::from_result(
                "levels",
                LevelAnalyzer::new().distribution(self.dataset.pivot()),
            ),
            clusters: PanelOutcome::from_result("clusters", self.clusters(params)),
        }
    }

    pub fn advisory(&self, params: &DashboardParams) -> Result<CityAdvisory> {
        let city = match &params.advisory_city {
            Some(city) => city.clone(),
            None => self
                .dataset
                .cities()
                .first()
                .cloned()
                .ok_or_else(|| AnalysisError::MissingData("Dataset has no cities".into()))?,
        };
        AdvisoryEngine::new(self.settings.advisory.clone()).advise_city(self.dataset.pivot(), &city)
    }

    pub fn clusters(&self, params: &DashboardParams) -> Result<ClusterPanel> {
        let pipeline =
            ClusterPipeline::new(self.settings.kmeans.clone(), self.settings.labels.clone());
        let result = pipeline.run(self.dataset.pivot(), &params.features, params.n_clusters)?;
        let profiles = ClusterProfileBuilder::new(
            self.settings.panels.priority_cities.clone(),
            self.settings.panels.representative_cities,
        )
        .build(&result);
        Ok(ClusterPanel { result, profiles })
    }
}
