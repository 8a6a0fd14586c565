use crate::analyzers::{
    CityAdvisory, CityRanking, CorrelationMatrix, LevelDistribution, ParticulateComposition,
    TrendSeries,
};
use crate::dashboard::{ClusterPanel, DashboardReport};
use crate::dataset::DatasetInfo;
use crate::error::Result;
use crate::processors::ClusteringResult;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Anything a command can print: a human summary plus a serde form
pub trait Report: Serialize {
    fn summary(&self) -> String;
}

macro_rules! impl_report {
    ($($ty:ty),* $(,)?) => {
        $(impl Report for $ty {
            fn summary(&self) -> String {
                <$ty>::summary(self)
            }
        })*
    };
}

impl_report!(
    CityAdvisory,
    CityRanking,
    TrendSeries,
    CorrelationMatrix,
    ParticulateComposition,
    LevelDistribution,
    ClusteringResult,
    DashboardReport,
    DatasetInfo,
);

impl Report for ClusterPanel {
    fn summary(&self) -> String {
        let mut lines = vec![self.result.summary(), String::new()];
        for profile in &self.profiles {
            let shape: Vec<String> = profile
                .features
                .iter()
                .zip(&profile.normalized)
                .map(|(f, v)| format!("{}={:.2}", f, v))
                .collect();
            lines.push(format!(
                "  {} [{}] e.g. {}: {}",
                profile.category.display_name(),
                profile.accent_color,
                profile.representatives.join(", "),
                shape.join(" ")
            ));
        }
        lines.join("\n")
    }
}

pub struct ReportWriter {
    format: OutputFormat,
    pretty: bool,
}

impl ReportWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn render<R: Report>(&self, report: &R) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Text => report.summary(),
            OutputFormat::Json if self.pretty => serde_json::to_string_pretty(report)?,
            OutputFormat::Json => serde_json::to_string(report)?,
        })
    }

    pub fn write<R: Report, W: Write>(&self, report: &R, out: &mut W) -> Result<()> {
        writeln!(out, "{}", self.render(report)?)?;
        Ok(())
    }

    pub fn write_to_file<R: Report>(&self, report: &R, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut out = BufWriter::new(File::create(path)?);
        self.write(report, &mut out)?;
        out.flush()?;
        debug!(path = %path.display(), "Wrote report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::LevelCount;
    use crate::models::AqiLevel;
    use tempfile::tempdir;

    fn distribution() -> LevelDistribution {
        LevelDistribution {
            counts: vec![LevelCount {
                level: AqiLevel::Good,
                count: 3,
            }],
            total: 3,
        }
    }

    #[test]
    fn test_text_and_json_render() {
        let report = distribution();
        let text = ReportWriter::new(OutputFormat::Text).render(&report).unwrap();
        assert!(text.contains("3 readings"));

        let json = ReportWriter::new(OutputFormat::Json)
            .with_pretty(false)
            .render(&report)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total"], 3);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("levels.json");
        ReportWriter::new(OutputFormat::Json)
            .write_to_file(&distribution(), &path)
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"total\": 3"));
    }
}
