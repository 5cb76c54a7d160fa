//! US EPA PM2.5 breakpoints and the health advisories attached to them.
//!
//! Concentrations are 24-hour PM2.5 in µg/m³, truncated to one decimal place
//! by the EPA's convention; hence the 0.1 step between one band's upper bound
//! and the next band's lower bound.

use serde::Serialize;

/// A health category on the AQI scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    Hazardous,
    #[serde(rename = "Extremely Hazardous")]
    ExtremelyHazardous,
}

impl Category {
    /// Human-readable name, as shown to users.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
            Category::ExtremelyHazardous => "Extremely Hazardous",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Guidance text for one health category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advisory {
    /// Who should act, and how.
    pub sensitive_group: &'static str,
    pub health_effect: &'static str,
    pub cautionary: &'static str,
}

/// One band of the PM2.5 breakpoint table.
/// Both ends of the concentration range are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub pm_low: f64,
    pub pm_high: f64,
    pub aqi_low: u16,
    pub aqi_high: u16,
    pub category: Category,
    pub advisory: Advisory,
}

impl Breakpoint {
    /// Unrounded AQI for a concentration, by linear interpolation across this band.
    pub(crate) fn interpolate(&self, pm25: f64) -> f64 {
        let aqi_low = f64::from(self.aqi_low);
        let aqi_high = f64::from(self.aqi_high);
        (aqi_high - aqi_low) / (self.pm_high - self.pm_low) * (pm25 - self.pm_low) + aqi_low
    }
}

/// Lowest concentration with a defined AQI.
pub const PM_MIN: f64 = 0.0;

/// Highest concentration with a defined AQI.
pub const PM_MAX: f64 = 500.4;

/// The EPA PM2.5 breakpoint table, ordered by concentration.
pub static BREAKPOINTS: [Breakpoint; 7] = [
    Breakpoint {
        pm_low: 0.0,
        pm_high: 12.0,
        aqi_low: 0,
        aqi_high: 50,
        category: Category::Good,
        advisory: Advisory {
            sensitive_group: "None",
            health_effect: "Air quality is considered satisfactory, and air pollution poses little or no risk.",
            cautionary: "Enjoy your usual outdoor activities.",
        },
    },
    Breakpoint {
        pm_low: 12.1,
        pm_high: 35.4,
        aqi_low: 51,
        aqi_high: 100,
        category: Category::Moderate,
        advisory: Advisory {
            sensitive_group: "Unusually sensitive people should consider reducing prolonged or heavy exertion.",
            health_effect: "Air quality is acceptable; however, for some pollutants there may be a moderate health concern for a very small number of people who are unusually sensitive to air pollution.",
            cautionary: "Active children and adults, and people with respiratory disease, such as asthma, should limit prolonged outdoor exertion.",
        },
    },
    Breakpoint {
        pm_low: 35.5,
        pm_high: 55.4,
        aqi_low: 101,
        aqi_high: 150,
        category: Category::UnhealthyForSensitiveGroups,
        advisory: Advisory {
            sensitive_group: "People with heart or lung disease, older adults, and children should reduce prolonged or heavy exertion.",
            health_effect: "Members of sensitive groups may experience health effects. The general public is not likely to be affected.",
            cautionary: "Active children and adults, and people with respiratory disease, such as asthma, should reduce prolonged outdoor exertion.",
        },
    },
    Breakpoint {
        pm_low: 55.5,
        pm_high: 150.4,
        aqi_low: 151,
        aqi_high: 200,
        category: Category::Unhealthy,
        advisory: Advisory {
            sensitive_group: "People with heart or lung disease, older adults, and children should avoid prolonged or heavy exertion. Everyone else should reduce prolonged or heavy exertion.",
            health_effect: "Everyone may begin to experience health effects; members of sensitive groups may experience more serious health effects.",
            cautionary: "Active children and adults, and people with respiratory disease, such as asthma, should avoid prolonged outdoor exertion; everyone else, especially children, should limit prolonged outdoor exertion.",
        },
    },
    Breakpoint {
        pm_low: 150.5,
        pm_high: 250.4,
        aqi_low: 201,
        aqi_high: 300,
        category: Category::VeryUnhealthy,
        advisory: Advisory {
            sensitive_group: "People with heart or lung disease, older adults, and children should avoid all outdoor physical activity. Everyone else should avoid prolonged or heavy exertion.",
            health_effect: "Health alert: everyone may experience more serious health effects.",
            cautionary: "Everyone should avoid all outdoor exertion.",
        },
    },
    Breakpoint {
        pm_low: 250.5,
        pm_high: 350.4,
        aqi_low: 301,
        aqi_high: 400,
        category: Category::Hazardous,
        advisory: Advisory {
            sensitive_group: "Everyone should avoid all outdoor physical activity.",
            health_effect: "Health warnings of emergency conditions. The entire population is more likely to be affected.",
            cautionary: "Remain indoors and keep activity levels low. Follow official health advice.",
        },
    },
    Breakpoint {
        pm_low: 350.5,
        pm_high: 500.4,
        aqi_low: 401,
        aqi_high: 500,
        category: Category::ExtremelyHazardous,
        advisory: Advisory {
            sensitive_group: "Everyone should remain indoors and avoid all physical activity. Follow guidance from public health officials.",
            health_effect: "Health warnings of emergency conditions. The entire population is at very high risk.",
            cautionary: "Remain indoors, keep windows closed, use air purifiers if available, and minimize all physical activity. Follow official health advice strictly.",
        },
    },
];

/// Find the band a concentration falls in.
///
/// Upper bounds are inclusive; a value in the gap above one band's upper bound
/// (e.g. 12.05) belongs to the next band.
/// Returns None outside of [PM_MIN, PM_MAX].
pub fn band_for(pm25: f64) -> Option<&'static Breakpoint> {
    if !(PM_MIN..=PM_MAX).contains(&pm25) {
        return None;
    }
    BREAKPOINTS.iter().find(|b| pm25 <= b.pm_high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_contiguous() {
        assert_eq!(BREAKPOINTS[0].pm_low, PM_MIN);
        assert_eq!(BREAKPOINTS[BREAKPOINTS.len() - 1].pm_high, PM_MAX);
        for pair in BREAKPOINTS.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            // Compare in tenths to sidestep binary representation of 0.1.
            let high_tenths = (lo.pm_high * 10.0).round() as i64;
            let low_tenths = (hi.pm_low * 10.0).round() as i64;
            assert_eq!(low_tenths, high_tenths + 1, "{:?} / {:?}", lo.category, hi.category);
            assert_eq!(hi.aqi_low, lo.aqi_high + 1);
            assert!(lo.category < hi.category);
        }
    }

    #[test]
    fn band_edges() {
        assert_eq!(band_for(0.0).unwrap().category, Category::Good);
        assert_eq!(band_for(12.0).unwrap().category, Category::Good);
        assert_eq!(band_for(12.05).unwrap().category, Category::Moderate);
        assert_eq!(band_for(12.1).unwrap().category, Category::Moderate);
        assert_eq!(band_for(500.4).unwrap().category, Category::ExtremelyHazardous);
        assert!(band_for(500.41).is_none());
        assert!(band_for(-0.01).is_none());
        assert!(band_for(f64::NAN).is_none());
    }

    #[test]
    fn interpolation_hits_band_ends() {
        for b in BREAKPOINTS.iter() {
            assert!((b.interpolate(b.pm_low) - f64::from(b.aqi_low)).abs() < 1e-9);
            assert!((b.interpolate(b.pm_high) - f64::from(b.aqi_high)).abs() < 1e-9);
        }
    }

    #[test]
    fn category_display() {
        assert_eq!(
            Category::UnhealthyForSensitiveGroups.to_string(),
            "Unhealthy for Sensitive Groups"
        );
        assert_eq!(format!("{}", Category::ExtremelyHazardous), "Extremely Hazardous");
    }
}
