//! Rough indicators derived from raw station readings.

use serde::Serialize;

/// Sky conditions, as best we can tell without a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Sunny,
    #[serde(rename = "partly cloudy")]
    PartlyCloudy,
    Cloudy,
    Rain,
    Snow,
}

/// At or below this temperature (°F), precipitation is reported as snow.
const SNOW_TEMP_F: f64 = 34.0;
/// Rain rate (in/hr) above which we call it raining.
const RAIN_RATE_IN: f64 = 0.01;
/// Solar radiation thresholds (W/m²).
const SUNNY_SOLAR: f64 = 600.0;
const PARTLY_CLOUDY_SOLAR: f64 = 200.0;

impl Condition {
    /// Infer conditions from temperature, rain and sunlight.
    ///
    /// Missing readings default to 40°F, no rain and no sun.
    pub fn infer(
        temp_f: Option<f64>,
        hourly_rain_in: Option<f64>,
        daily_rain_in: Option<f64>,
        solar_radiation: Option<f64>,
    ) -> Self {
        let temp_f = temp_f.unwrap_or(40.0);
        let rain_rate = hourly_rain_in.unwrap_or(0.0);
        let daily_rain = daily_rain_in.unwrap_or(0.0);
        let solar = solar_radiation.unwrap_or(0.0);
        let freezing = temp_f <= SNOW_TEMP_F;

        if rain_rate > RAIN_RATE_IN {
            if freezing {
                Condition::Snow
            } else {
                Condition::Rain
            }
        } else if freezing && (rain_rate > 0.0 || daily_rain > 0.0) {
            Condition::Snow
        } else if solar > SUNNY_SOLAR {
            Condition::Sunny
        } else if solar > PARTLY_CLOUDY_SOLAR {
            Condition::PartlyCloudy
        } else {
            Condition::Cloudy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::PartlyCloudy => "partly cloudy",
            Condition::Cloudy => "cloudy",
            Condition::Rain => "rain",
            Condition::Snow => "snow",
        }
    }
}

impl core::fmt::Display for Condition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// WHO UV index exposure levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
    Extreme,
}

impl UvLevel {
    pub fn from_index(uv: f64) -> Self {
        if uv < 3.0 {
            UvLevel::Low
        } else if uv < 6.0 {
            UvLevel::Moderate
        } else if uv < 8.0 {
            UvLevel::High
        } else if uv < 11.0 {
            UvLevel::VeryHigh
        } else {
            UvLevel::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UvLevel::Low => "LOW",
            UvLevel::Moderate => "MODERATE",
            UvLevel::High => "HIGH",
            UvLevel::VeryHigh => "VERY HIGH",
            UvLevel::Extreme => "EXTREME",
        }
    }
}

impl core::fmt::Display for UvLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_or_snow_by_temperature() {
        assert_eq!(
            Condition::infer(Some(50.0), Some(0.1), None, Some(900.0)),
            Condition::Rain
        );
        assert_eq!(
            Condition::infer(Some(30.0), Some(0.1), None, None),
            Condition::Snow
        );
        // Light precipitation earlier in the day, below freezing.
        assert_eq!(
            Condition::infer(Some(34.0), Some(0.0), Some(0.2), None),
            Condition::Snow
        );
        // ...but above freezing, that's just a cloudy day.
        assert_eq!(
            Condition::infer(Some(35.0), Some(0.0), Some(0.2), None),
            Condition::Cloudy
        );
    }

    #[test]
    fn sunlight() {
        assert_eq!(Condition::infer(None, None, None, Some(601.0)), Condition::Sunny);
        assert_eq!(Condition::infer(None, None, None, Some(600.0)), Condition::PartlyCloudy);
        assert_eq!(Condition::infer(None, None, None, Some(200.0)), Condition::Cloudy);
        assert_eq!(Condition::infer(None, None, None, None), Condition::Cloudy);
    }

    #[test]
    fn uv_levels() {
        assert_eq!(UvLevel::from_index(0.0), UvLevel::Low);
        assert_eq!(UvLevel::from_index(2.9), UvLevel::Low);
        assert_eq!(UvLevel::from_index(3.0), UvLevel::Moderate);
        assert_eq!(UvLevel::from_index(7.5), UvLevel::High);
        assert_eq!(UvLevel::from_index(10.0), UvLevel::VeryHigh);
        assert_eq!(UvLevel::from_index(11.0), UvLevel::Extreme);
        assert_eq!(UvLevel::VeryHigh.to_string(), "VERY HIGH");
    }

    #[test]
    fn json_names_match_labels() {
        for c in [
            Condition::Sunny,
            Condition::PartlyCloudy,
            Condition::Cloudy,
            Condition::Rain,
            Condition::Snow,
        ] {
            assert_eq!(serde_json::to_value(c).unwrap(), c.label());
        }
        for uv in [
            UvLevel::Low,
            UvLevel::Moderate,
            UvLevel::High,
            UvLevel::VeryHigh,
            UvLevel::Extreme,
        ] {
            assert_eq!(serde_json::to_value(uv).unwrap(), uv.label());
        }
    }
}
