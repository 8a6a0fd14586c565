use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Failed to load dataset: {0}")]
    Load(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error(
        "Configuration error: only {} of the requested features matched [{}]; need at least {minimum}",
        .matched.len(),
        .matched.join(", ")
    )]
    Configuration {
        requested: Vec<String>,
        matched: Vec<String>,
        minimum: usize,
    },

    #[error("Column '{0}' is not present in the pivoted table")]
    MissingColumn(String),

    #[error("City '{0}' not found in dataset")]
    UnknownCity(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Clustering failed: {0}")]
    Clustering(#[from] linfa_clustering::KMeansError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Load failures stop the whole dashboard; everything else is scoped to one panel.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::Io(_)
                | AnalysisError::Csv(_)
                | AnalysisError::DateParse(_)
                | AnalysisError::Load(_)
        )
    }

    /// Soft errors make a panel omit itself instead of reporting a failure.
    pub fn is_soft(&self) -> bool {
        matches!(self, AnalysisError::MissingColumn(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_lists_matches() {
        let err = AnalysisError::Configuration {
            requested: vec!["AQI".into(), "PM2.5".into(), "CO".into()],
            matched: vec!["AQI".into(), "CO".into()],
            minimum: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("only 2"));
        assert!(msg.contains("[AQI, CO]"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_scoping() {
        assert!(AnalysisError::Load("boom".into()).is_fatal());
        assert!(AnalysisError::MissingColumn("PM10".into()).is_soft());
        assert!(!AnalysisError::InsufficientData("none".into()).is_fatal());
    }
}
