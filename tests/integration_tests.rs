use aqi_explorer::analyzers::{ColorClass, RankingAnalyzer, RankingMode};
use aqi_explorer::models::ClusterCategory;
use aqi_explorer::processors::ClusterPipeline;
use aqi_explorer::writers::{OutputFormat, ReportWriter};
use aqi_explorer::{AnalysisError, AnalysisSettings, Dashboard, DashboardParams, Dataset, PanelOutcome};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

const TYPES: [&str; 6] = ["AQI", "PM2.5", "PM10", "CO", "NO2", "SO2"];

/// City name plus a base profile in `TYPES` order
const CITIES: [(&str, [f64; 6]); 6] = [
    ("三亚", [25.0, 10.0, 20.0, 0.4, 10.0, 4.0]),
    ("海口", [28.0, 12.0, 24.0, 0.5, 12.0, 5.0]),
    ("喀什地区", [240.0, 70.0, 320.0, 0.9, 20.0, 8.0]),
    ("和田地区", [260.0, 75.0, 350.0, 1.0, 22.0, 9.0]),
    ("唐山", [140.0, 100.0, 150.0, 1.6, 40.0, 35.0]),
    ("邯郸", [150.0, 105.0, 160.0, 1.7, 42.0, 38.0]),
];

fn write_csv(types: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let header: Vec<&str> = CITIES.iter().map(|(name, _)| *name).collect();
    writeln!(file, "date,hour,type,{}", header.join(",")).unwrap();

    for hour in 0..2 {
        for (t, name) in TYPES.iter().enumerate() {
            if !types.contains(name) {
                continue;
            }
            let cells: Vec<String> = CITIES
                .iter()
                .map(|(_, base)| format!("{}", base[t] + hour as f64))
                .collect();
            writeln!(file, "20251206,{},{},{}", hour, name, cells.join(",")).unwrap();
        }
    }
    file.flush().unwrap();
    file
}

fn load_full() -> (NamedTempFile, Dataset) {
    let file = write_csv(&TYPES);
    let dataset = Dataset::load(file.path()).unwrap();
    (file, dataset)
}

#[test]
fn test_load_reshapes_every_cell() {
    let (_file, dataset) = load_full();

    assert_eq!(dataset.cities().len(), 6);
    assert_eq!(dataset.long().len(), 2 * TYPES.len() * CITIES.len());
    assert_eq!(dataset.pivot().len(), 2 * CITIES.len());
    assert_eq!(dataset.measurement_types(), TYPES.to_vec());

    let info = dataset.info();
    assert_eq!(info.missing_cells, 0);
    assert_eq!(info.cities.len(), 6);
}

#[test]
fn test_advisory_uses_latest_reading() {
    let (_file, dataset) = load_full();
    let settings = AnalysisSettings::default();
    let mut params = DashboardParams::from_settings(&settings);
    params.advisory_city = Some("喀什地区".to_string());

    let advice = Dashboard::new(&dataset, &settings).advisory(&params).unwrap();
    assert_eq!(advice.aqi, 241.0);
    assert_eq!(advice.advisory.tier, 4);
    assert_eq!(advice.advisory.color, ColorClass::Danger);
    assert!(advice.advisory.dust);
}

#[test]
fn test_ranking_from_loaded_file() {
    let (_file, dataset) = load_full();
    let ranking = RankingAnalyzer::new(2)
        .rank(dataset.long(), "AQI", RankingMode::Clean)
        .unwrap();
    let cities: Vec<&str> = ranking.entries.iter().map(|e| e.city.as_str()).collect();
    assert_eq!(cities, vec!["三亚", "海口"]);
}

#[test]
fn test_clustering_is_deterministic_and_labelled() {
    let (_file, dataset) = load_full();
    let settings = AnalysisSettings::default();
    let pipeline = ClusterPipeline::new(settings.kmeans.clone(), settings.labels.clone());
    let features = pipeline.default_features().to_vec();

    let first = pipeline.run(dataset.pivot(), &features, 3).unwrap();
    let second = pipeline.run(dataset.pivot(), &features, 3).unwrap();
    assert_eq!(first, second);

    let category = |city: &str| {
        let id = first.cluster_of(city).unwrap();
        first.label_of(id).unwrap().category
    };
    assert_eq!(category("三亚"), ClusterCategory::Pristine);
    assert_eq!(category("和田地区"), ClusterCategory::SevereDustStorm);
    assert_eq!(category("邯郸"), ClusterCategory::HeavyIndustrial);
}

#[test]
fn test_dashboard_scopes_missing_columns_to_their_panel() {
    let file = write_csv(&["AQI", "PM2.5", "CO", "NO2", "SO2"]);
    let dataset = Dataset::load(file.path()).unwrap();
    let settings = AnalysisSettings::default();
    let mut params = DashboardParams::from_settings(&settings);
    params.trend_cities = vec!["唐山".to_string()];
    params.n_clusters = 3;

    let report = Dashboard::new(&dataset, &settings).build(&params);

    assert!(matches!(report.composition, PanelOutcome::Omitted(_)));
    assert!(report.advisory.is_ready());
    assert!(report.trend.is_ready());
    assert!(report.levels.is_ready());
    let clusters = report.clusters.ready().unwrap();
    assert!(!clusters.result.features.contains(&"PM10".to_string()));
    assert_eq!(clusters.profiles.len(), clusters.result.labels.len());

    let json = ReportWriter::new(OutputFormat::Json).render(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["composition"]["status"], "omitted");
    assert_eq!(value["levels"]["status"], "ready");
}

#[test]
fn test_missing_file_is_fatal() {
    let err = Dataset::load(std::path::Path::new("/nonexistent/aqi.csv")).unwrap_err();
    assert!(matches!(err, AnalysisError::Load(_)));
    assert!(err.is_fatal());
}
