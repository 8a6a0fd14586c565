/// Required metadata columns in the wide input table
pub const DATE_COLUMN: &str = "date";
pub const HOUR_COLUMN: &str = "hour";
pub const TYPE_COLUMN: &str = "type";

/// Pre-derived column that must never be treated as a city
pub const DERIVED_DATETIME_COLUMN: &str = "datetime";

/// Format of the `date` column; the hour comes from its own column
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Cell values treated as missing
pub const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "-"];

/// Standard measurement type names
pub const TYPE_AQI: &str = "AQI";
pub const TYPE_PM25: &str = "PM2.5";
pub const TYPE_PM10: &str = "PM10";
pub const TYPE_CO: &str = "CO";
pub const TYPE_NO2: &str = "NO2";
pub const TYPE_SO2: &str = "SO2";
pub const TYPE_O3: &str = "O3";

/// Default clustering features, in matrix column order
pub const DEFAULT_CLUSTER_FEATURES: &[&str] =
    &[TYPE_AQI, TYPE_PM25, TYPE_PM10, TYPE_CO, TYPE_NO2, TYPE_SO2];

/// Columns considered by the correlation panel, in display order
pub const CORRELATION_COLUMNS: &[&str] = &[
    TYPE_AQI, TYPE_PM25, TYPE_PM10, TYPE_CO, TYPE_NO2, TYPE_SO2, TYPE_O3,
];

/// Fewer resolved features than this make centroid labeling unreliable
pub const MIN_CLUSTER_FEATURES: usize = 3;

/// K-Means defaults
pub const MIN_CLUSTERS: usize = 2;
pub const MAX_CLUSTERS: usize = 8;
pub const DEFAULT_CLUSTERS: usize = 6;
pub const KMEANS_SEED: u64 = 42;
pub const KMEANS_RESTARTS: usize = 10;
pub const KMEANS_MAX_ITERATIONS: usize = 300;
pub const KMEANS_TOLERANCE: f64 = 1e-4;

/// Advisory tier thresholds (AQI strictly greater than)
pub const ADVISORY_MODERATE_AQI: f64 = 50.0;
pub const ADVISORY_SENSITIVE_AQI: f64 = 100.0;
pub const ADVISORY_UNHEALTHY_AQI: f64 = 150.0;
pub const ADVISORY_VERY_UNHEALTHY_AQI: f64 = 200.0;
pub const ADVISORY_HAZARDOUS_AQI: f64 = 300.0;

/// Advisory dust heuristic: PM10 > limit and PM10 / (PM2.5 + guard) > ratio
pub const ADVISORY_DUST_PM10: f64 = 150.0;
pub const ADVISORY_DUST_RATIO: f64 = 2.0;
pub const ADVISORY_DUST_GUARD: f64 = 1.0;

/// Cluster label thresholds. Rule order, not threshold size, breaks ties.
pub const LABEL_PRISTINE_AQI: f64 = 35.0;
pub const LABEL_SEVERE_DUST_PM10: f64 = 200.0;
pub const LABEL_SEVERE_DUST_RATIO: f64 = 2.5;
pub const LABEL_FLOATING_DUST_PM10: f64 = 120.0;
pub const LABEL_FLOATING_DUST_RATIO: f64 = 2.0;
pub const LABEL_DUST_RATIO_GUARD: f64 = 0.1;
pub const LABEL_HEAVY_INDUSTRY_SO2: f64 = 25.0;
pub const LABEL_LIGHT_INDUSTRY_SO2: f64 = 15.0;
pub const LABEL_LIGHT_INDUSTRY_CO: f64 = 1.0;
pub const LABEL_TRAFFIC_NO2: f64 = 45.0;
pub const LABEL_SEVERE_COMPOSITE_AQI: f64 = 200.0;
pub const LABEL_HEAVY_HAZE_AQI: f64 = 150.0;
pub const LABEL_LIGHT_HAZE_AQI: f64 = 100.0;
pub const LABEL_CLEAN_LIVEABLE_AQI: f64 = 70.0;

/// Panel defaults
pub const DEFAULT_RANKING_SIZE: usize = 15;
pub const REPRESENTATIVE_CITY_COUNT: usize = 3;
pub const COMPOSITION_REFERENCE_MAX: f64 = 500.0;

/// Cities listed first when naming a cluster's members
pub const PRIORITY_CITIES: &[&str] = &["北京", "上海", "西安", "喀什地区", "三亚", "唐山", "武汉"];

/// Default cities compared in the trend panel
pub const DEFAULT_TREND_CITIES: &[&str] = &["北京", "上海", "西安", "广州"];

/// Environment prefix for settings overrides (e.g. AQI_KMEANS__SEED)
pub const SETTINGS_ENV_PREFIX: &str = "AQI";

/// Buffer size for reading the input table
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
