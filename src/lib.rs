pub mod analyzers;
pub mod cli;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod settings;
pub mod utils;
pub mod writers;

pub use dashboard::{Dashboard, DashboardParams, DashboardReport, PanelOutcome};
pub use dataset::Dataset;
pub use error::{AnalysisError, Result};
pub use settings::AnalysisSettings;
