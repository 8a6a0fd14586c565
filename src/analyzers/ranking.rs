use crate::error::{AnalysisError, Result};
use crate::models::{describe_type, LongRecord};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// Highest mean values first
    Polluted,
    /// Lowest mean values first
    Clean,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityMean {
    pub city: String,
    pub mean: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityRanking {
    pub measurement_type: String,
    pub mode: RankingMode,
    pub entries: Vec<CityMean>,
}

impl CityRanking {
    pub fn summary(&self) -> String {
        let title = match self.mode {
            RankingMode::Polluted => "most polluted",
            RankingMode::Clean => "cleanest",
        };
        let mut lines = vec![format!(
            "Top {} {} cities by mean {}",
            self.entries.len(),
            title,
            describe_type(&self.measurement_type)
        )];
        for (i, entry) in self.entries.iter().enumerate() {
            lines.push(format!("{:>3}. {:<12} {:>8.1}", i + 1, entry.city, entry.mean));
        }
        lines.join("\n")
    }
}

pub struct RankingAnalyzer {
    size: usize,
}

impl RankingAnalyzer {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Mean per city for one type, descending. Cities with no value are left out.
    pub fn city_means(&self, records: &[LongRecord], measurement_type: &str) -> Vec<CityMean> {
        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for record in records.iter().filter(|r| r.measurement_type == measurement_type) {
            if let Some(value) = record.value {
                let entry = sums.entry(record.city.as_str()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }

        let mut means: Vec<CityMean> = sums
            .into_iter()
            .map(|(city, (sum, count))| CityMean {
                city: city.to_string(),
                mean: sum / count as f64,
                samples: count,
            })
            .collect();
        means.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.city.cmp(&b.city)));
        means
    }

    /// Polluted: head of the descending list. Clean: tail, shown ascending.
    pub fn rank(
        &self,
        records: &[LongRecord],
        measurement_type: &str,
        mode: RankingMode,
    ) -> Result<CityRanking> {
        let means = self.city_means(records, measurement_type);
        if means.is_empty() {
            return Err(AnalysisError::MissingData(format!(
                "No values recorded for '{}'",
                measurement_type
            )));
        }

        let entries = match mode {
            RankingMode::Polluted => means.into_iter().take(self.size).collect(),
            RankingMode::Clean => {
                let skip = means.len().saturating_sub(self.size);
                let mut tail: Vec<CityMean> = means.into_iter().skip(skip).collect();
                tail.reverse();
                tail
            }
        };

        Ok(CityRanking {
            measurement_type: measurement_type.to_string(),
            mode,
            entries,
        })
    }
}
