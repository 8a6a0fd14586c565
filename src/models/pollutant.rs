use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    TYPE_AQI, TYPE_CO, TYPE_NO2, TYPE_O3, TYPE_PM10, TYPE_PM25, TYPE_SO2,
};

/// The standard measurement types. Input files may carry more (e.g. `PM2.5_24h`);
/// those stay plain strings in the long and pivoted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    Aqi,
    Pm25,
    Pm10,
    Co,
    No2,
    So2,
    O3,
}

impl Pollutant {
    /// Exact match against the column names used by the source files
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            TYPE_AQI => Some(Pollutant::Aqi),
            TYPE_PM25 => Some(Pollutant::Pm25),
            TYPE_PM10 => Some(Pollutant::Pm10),
            TYPE_CO => Some(Pollutant::Co),
            TYPE_NO2 => Some(Pollutant::No2),
            TYPE_SO2 => Some(Pollutant::So2),
            TYPE_O3 => Some(Pollutant::O3),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Pollutant::Aqi => TYPE_AQI,
            Pollutant::Pm25 => TYPE_PM25,
            Pollutant::Pm10 => TYPE_PM10,
            Pollutant::Co => TYPE_CO,
            Pollutant::No2 => TYPE_NO2,
            Pollutant::So2 => TYPE_SO2,
            Pollutant::O3 => TYPE_O3,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Pollutant::Aqi => "Air Quality Index",
            Pollutant::Pm25 => "Fine particulates",
            Pollutant::Pm10 => "Coarse particulates",
            Pollutant::Co => "Carbon monoxide",
            Pollutant::No2 => "Nitrogen dioxide",
            Pollutant::So2 => "Sulphur dioxide",
            Pollutant::O3 => "Ozone",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Pollutant::Aqi => "index",
            Pollutant::Co => "mg/m³",
            _ => "μg/m³",
        }
    }
}

/// Heading text for a measurement type. Standard pollutants get their long
/// name and units; anything else is shown as-is.
pub fn describe_type(name: &str) -> String {
    match Pollutant::from_type_name(name) {
        Some(p) => format!("{} ({}, {})", name, p.display_name(), p.units()),
        None => name.to_string(),
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Fold a measurement name to a comparison key: case-insensitive, ignoring
/// `.`, `_`, `-` and whitespace. `pm2_5`, `PM2.5` and `Pm 2.5` share a key.
pub fn normalize_type_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '.' | '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// National AQI levels used by the distribution panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiLevel {
    Excellent,
    Good,
    LightlyPolluted,
    ModeratelyPolluted,
    HeavilyPolluted,
    SeverelyPolluted,
}

impl AqiLevel {
    pub const ALL: [AqiLevel; 6] = [
        AqiLevel::Excellent,
        AqiLevel::Good,
        AqiLevel::LightlyPolluted,
        AqiLevel::ModeratelyPolluted,
        AqiLevel::HeavilyPolluted,
        AqiLevel::SeverelyPolluted,
    ];

    /// Upper bounds are inclusive
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 50.0 {
            AqiLevel::Excellent
        } else if aqi <= 100.0 {
            AqiLevel::Good
        } else if aqi <= 150.0 {
            AqiLevel::LightlyPolluted
        } else if aqi <= 200.0 {
            AqiLevel::ModeratelyPolluted
        } else if aqi <= 300.0 {
            AqiLevel::HeavilyPolluted
        } else {
            AqiLevel::SeverelyPolluted
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AqiLevel::Excellent => "Excellent",
            AqiLevel::Good => "Good",
            AqiLevel::LightlyPolluted => "Lightly Polluted",
            AqiLevel::ModeratelyPolluted => "Moderately Polluted",
            AqiLevel::HeavilyPolluted => "Heavily Polluted",
            AqiLevel::SeverelyPolluted => "Severely Polluted",
        }
    }
}

impl std::fmt::Display for AqiLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pollutant_round_trip_names() {
        for pollutant in [
            Pollutant::Aqi,
            Pollutant::Pm25,
            Pollutant::Pm10,
            Pollutant::Co,
            Pollutant::No2,
            Pollutant::So2,
            Pollutant::O3,
        ] {
            assert_eq!(Pollutant::from_type_name(pollutant.type_name()), Some(pollutant));
        }
        assert_eq!(Pollutant::from_type_name("PM2.5_24h"), None);
    }

    #[test]
    fn test_describe_type() {
        assert_eq!(describe_type("CO"), "CO (Carbon monoxide, mg/m³)");
        assert_eq!(describe_type("AQI"), "AQI (Air Quality Index, index)");
        assert_eq!(describe_type("PM2.5_24h"), "PM2.5_24h");
    }

    #[test]
    fn test_normalize_type_name() {
        assert_eq!(normalize_type_name("PM2.5"), "PM25");
        assert_eq!(normalize_type_name("pm2_5"), "PM25");
        assert_eq!(normalize_type_name(" Pm 2.5 "), "PM25");
        assert_ne!(normalize_type_name("PM2.5_24h"), normalize_type_name("PM2.5"));
    }

    #[test]
    fn test_aqi_level_boundaries() {
        assert_eq!(AqiLevel::from_aqi(50.0), AqiLevel::Excellent);
        assert_eq!(AqiLevel::from_aqi(50.5), AqiLevel::Good);
        assert_eq!(AqiLevel::from_aqi(150.0), AqiLevel::LightlyPolluted);
        assert_eq!(AqiLevel::from_aqi(200.0), AqiLevel::ModeratelyPolluted);
        assert_eq!(AqiLevel::from_aqi(300.0), AqiLevel::HeavilyPolluted);
        assert_eq!(AqiLevel::from_aqi(301.0), AqiLevel::SeverelyPolluted);
    }
}
