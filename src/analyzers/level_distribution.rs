use crate::error::{AnalysisError, Result};
use crate::models::{AqiLevel, PivotTable, Pollutant};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCount {
    pub level: AqiLevel,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelDistribution {
    /// Levels in severity order, zero counts omitted
    pub counts: Vec<LevelCount>,
    pub total: usize,
}

impl LevelDistribution {
    pub fn share(&self, level: AqiLevel) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.counts
            .iter()
            .find(|c| c.level == level)
            .map_or(0.0, |c| c.count as f64 / self.total as f64)
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("AQI level distribution ({} readings)", self.total)];
        for c in &self.counts {
            lines.push(format!(
                "  {:<20} {:>6} ({:.1}%)",
                c.level.display_name(),
                c.count,
                self.share(c.level) * 100.0
            ));
        }
        lines.join("\n")
    }
}

pub struct LevelAnalyzer;

impl LevelAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn distribution(&self, pivot: &PivotTable) -> Result<LevelDistribution> {
        let column = Pollutant::Aqi.type_name();
        if !pivot.has_column(column) {
            return Err(AnalysisError::MissingColumn(column.to_string()));
        }

        let mut counts: BTreeMap<AqiLevel, usize> = BTreeMap::new();
        for aqi in pivot.column_values(column).into_iter().flatten() {
            *counts.entry(AqiLevel::from_aqi(aqi)).or_default() += 1;
        }

        let total = counts.values().sum();
        Ok(LevelDistribution {
            counts: counts
                .into_iter()
                .map(|(level, count)| LevelCount { level, count })
                .collect(),
            total,
        })
    }
}

impl Default for LevelAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PivotRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_counts_by_level() {
        let records = [30.0, 45.0, 80.0, 180.0, 420.0]
            .iter()
            .enumerate()
            .map(|(h, aqi)| {
                let ts = NaiveDate::from_ymd_opt(2025, 12, 6)
                    .unwrap()
                    .and_hms_opt(h as u32, 0, 0)
                    .unwrap();
                let mut r = PivotRecord::new(ts, "武汉".into());
                r.values.insert("AQI".into(), *aqi);
                r
            })
            .collect();
        let pivot = PivotTable::new(vec!["AQI".into()], records);

        let dist = LevelAnalyzer::new().distribution(&pivot).unwrap();
        assert_eq!(dist.total, 5);
        assert_eq!(
            dist.counts,
            vec![
                LevelCount { level: AqiLevel::Excellent, count: 2 },
                LevelCount { level: AqiLevel::Good, count: 1 },
                LevelCount { level: AqiLevel::ModeratelyPolluted, count: 1 },
                LevelCount { level: AqiLevel::SeverelyPolluted, count: 1 },
            ]
        );
        assert_eq!(dist.share(AqiLevel::Excellent), 0.4);
        assert_eq!(dist.share(AqiLevel::HeavilyPolluted), 0.0);
    }

    #[test]
    fn test_without_aqi_column() {
        let pivot = PivotTable::new(vec!["PM10".into()], vec![]);
        assert!(LevelAnalyzer::new().distribution(&pivot).unwrap_err().is_soft());
    }
}
