use crate::error::{AnalysisError, Result};
use crate::models::{PivotTable, Pollutant};
use crate::settings::AdvisoryThresholds;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    Ok,
    Caution,
    Danger,
}

impl ColorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorClass::Ok => "ok",
            ColorClass::Caution => "caution",
            ColorClass::Danger => "danger",
        }
    }
}

/// One row of the tier table: applies when AQI exceeds `above`
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryBand {
    pub above: f64,
    pub tier: u8,
    pub message: &'static str,
    pub color: ColorClass,
}

pub const GOOD_MESSAGE: &str = "Air quality is good. A fine time for outdoor activities!";
pub const DUST_WARNING: &str =
    "Dust-storm signature detected: protect yourself against wind-blown sand and dust.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub tier: u8,
    pub color: ColorClass,
    pub message: String,
    pub dust: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAdvisory {
    pub city: String,
    pub timestamp: NaiveDateTime,
    pub aqi: f64,
    pub pm10: Option<f64>,
    pub pm25: Option<f64>,
    pub advisory: Advisory,
}

impl CityAdvisory {
    pub fn summary(&self) -> String {
        format!(
            "{} @ {}\nCurrent AQI: {:.0} (tier {}, {})\n{}",
            self.city,
            self.timestamp,
            self.aqi,
            self.advisory.tier,
            self.advisory.color.as_str(),
            self.advisory.message
        )
    }
}

/// Threshold table plus the dust heuristic. Pure: same inputs, same advice.
pub struct AdvisoryEngine {
    bands: Vec<AdvisoryBand>,
    thresholds: AdvisoryThresholds,
}

impl AdvisoryEngine {
    pub fn new(thresholds: AdvisoryThresholds) -> Self {
        let bands = vec![
            AdvisoryBand {
                above: thresholds.moderate_aqi,
                tier: 1,
                message: "Air quality is acceptable; sensitive groups should take care.",
                color: ColorClass::Caution,
            },
            AdvisoryBand {
                above: thresholds.sensitive_aqi,
                tier: 2,
                message: "Light pollution. Wearing a mask outdoors is advised.",
                color: ColorClass::Caution,
            },
            AdvisoryBand {
                above: thresholds.unhealthy_aqi,
                tier: 3,
                message: "Moderate pollution. Reduce time spent outdoors.",
                color: ColorClass::Danger,
            },
            AdvisoryBand {
                above: thresholds.very_unhealthy_aqi,
                tier: 4,
                message: "Heavy pollution. No outdoor exercise!",
                color: ColorClass::Danger,
            },
            AdvisoryBand {
                above: thresholds.hazardous_aqi,
                tier: 5,
                message: "Severe pollution. Stay inside and run an air purifier!",
                color: ColorClass::Danger,
            },
        ];
        Self { bands, thresholds }
    }

    pub fn bands(&self) -> &[AdvisoryBand] {
        &self.bands
    }

    /// Scan the table once; the last band whose threshold AQI exceeds wins.
    pub fn advise(&self, aqi: f64, pm10: Option<f64>, pm25: Option<f64>) -> Advisory {
        let (tier, message, color) = self
            .bands
            .iter()
            .filter(|band| aqi > band.above)
            .last()
            .map_or((0, GOOD_MESSAGE, ColorClass::Ok), |band| {
                (band.tier, band.message, band.color)
            });

        let dust = self.is_dust(pm10, pm25);
        let mut message = message.to_string();
        if dust {
            message.push_str("\n\n");
            message.push_str(DUST_WARNING);
        }

        Advisory {
            tier,
            color,
            message,
            dust,
        }
    }

    /// PM10 over its limit and coarse-dominated; `dust_guard` keeps the
    /// ratio finite when PM2.5 is 0
    pub fn is_dust(&self, pm10: Option<f64>, pm25: Option<f64>) -> bool {
        match (pm10, pm25) {
            (Some(pm10), Some(pm25)) => {
                pm10 > self.thresholds.dust_pm10
                    && pm10 / (pm25 + self.thresholds.dust_guard) > self.thresholds.dust_ratio
            }
            _ => false,
        }
    }

    /// Advise from the city's row with the latest timestamp
    pub fn advise_city(&self, pivot: &PivotTable, city: &str) -> Result<CityAdvisory> {
        let latest = pivot
            .latest_for_city(city)
            .ok_or_else(|| AnalysisError::UnknownCity(city.to_string()))?;

        let aqi = latest.get(Pollutant::Aqi.type_name()).ok_or_else(|| {
            AnalysisError::MissingData(format!(
                "No AQI reading for {} at {}",
                city, latest.timestamp
            ))
        })?;
        let pm10 = latest.get(Pollutant::Pm10.type_name());
        let pm25 = latest.get(Pollutant::Pm25.type_name());

        Ok(CityAdvisory {
            city: city.to_string(),
            timestamp: latest.timestamp,
            aqi,
            pm10,
            pm25,
            advisory: self.advise(aqi, pm10, pm25),
        })
    }
}

impl Default for AdvisoryEngine {
    fn default() -> Self {
        Self::new(AdvisoryThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PivotRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_tiers_are_monotonic() {
        let engine = AdvisoryEngine::default();
        let tiers: Vec<u8> = [10.0, 60.0, 120.0, 170.0, 250.0, 350.0]
            .iter()
            .map(|&aqi| engine.advise(aqi, None, None).tier)
            .collect();
        assert_eq!(tiers, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_threshold_values_are_exclusive() {
        let engine = AdvisoryEngine::default();
        assert_eq!(engine.advise(50.0, None, None).tier, 0);
        assert_eq!(engine.advise(100.0, None, None).tier, 1);
        assert_eq!(engine.advise(300.0, None, None).tier, 4);
    }

    #[test]
    fn test_color_classes() {
        let engine = AdvisoryEngine::default();
        assert_eq!(engine.advise(20.0, None, None).color, ColorClass::Ok);
        assert_eq!(engine.advise(80.0, None, None).color, ColorClass::Caution);
        assert_eq!(engine.advise(140.0, None, None).color, ColorClass::Caution);
        assert_eq!(engine.advise(160.0, None, None).color, ColorClass::Danger);
        assert_eq!(engine.advise(400.0, None, None).color, ColorClass::Danger);
    }

    #[test]
    fn test_dust_boundary() {
        let engine = AdvisoryEngine::default();
        // 150 / 75 = 2.0 and PM10 is not above 150
        let calm = engine.advise(120.0, Some(150.0), Some(74.0));
        assert!(!calm.dust);
        assert!(!calm.message.contains(DUST_WARNING));

        let dusty = engine.advise(120.0, Some(151.0), Some(74.0));
        assert!(dusty.dust);
        assert!(dusty.message.ends_with(DUST_WARNING));
        assert_eq!(dusty.tier, 2);
    }

    #[test]
    fn test_dust_independent_of_tier() {
        let engine = AdvisoryEngine::default();
        let advisory = engine.advise(40.0, Some(200.0), Some(0.0));
        assert_eq!(advisory.tier, 0);
        assert!(advisory.dust);
    }

    #[test]
    fn test_advise_city_uses_latest_row() {
        let mut early = PivotRecord::new(
            NaiveDate::from_ymd_opt(2025, 12, 6).unwrap().and_hms_opt(1, 0, 0).unwrap(),
            "西安".to_string(),
        );
        early.values.insert("AQI".into(), 320.0);
        let mut late = PivotRecord::new(
            NaiveDate::from_ymd_opt(2025, 12, 6).unwrap().and_hms_opt(22, 0, 0).unwrap(),
            "西安".to_string(),
        );
        late.values.insert("AQI".into(), 75.0);
        let pivot = PivotTable::new(vec!["AQI".into()], vec![late, early]);

        let engine = AdvisoryEngine::default();
        let advice = engine.advise_city(&pivot, "西安").unwrap();
        assert_eq!(advice.aqi, 75.0);
        assert_eq!(advice.advisory.tier, 1);
        assert!(!advice.advisory.dust);

        assert!(matches!(
            engine.advise_city(&pivot, "拉萨"),
            Err(AnalysisError::UnknownCity(_))
        ));
    }
}
