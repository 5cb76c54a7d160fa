//! Convert PM2.5 concentrations into US EPA Air Quality Index values.
//!
//! The AQI for PM2.5 is a piecewise-linear function of the concentration,
//! defined by the EPA's [breakpoint table](https://www.airnow.gov/sites/default/files/2020-05/aqi-technical-assistance-document-sept2018.pdf).
//! Each band of the table also carries a health advisory.
//!
//! ```
//! let c = aqi::classify(35.5).unwrap();
//! assert_eq!(c.aqi, 101);
//! assert_eq!(c.category, aqi::Category::UnhealthyForSensitiveGroups);
//! ```

use serde::Serialize;

mod breakpoints;

pub use breakpoints::{band_for, Advisory, Breakpoint, Category, BREAKPOINTS, PM_MAX, PM_MIN};

/// An error in classifying a PM2.5 reading.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    /// The reading was absent, or not a number.
    #[error("Invalid PM2.5 value")]
    InvalidInput,
    /// The reading is a number, but outside of the range covered by the AQI.
    /// NaN and the infinities land here too.
    #[error("PM2.5 value out of range (0-500.4 µg/m³).")]
    OutOfRange(f64),
}

/// How to turn the interpolated AQI into an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rounding {
    /// Round to nearest, ties to even: 12.5 becomes 12.
    #[default]
    HalfEven,
    /// Drop the fractional part.
    Truncate,
}

impl Rounding {
    fn apply(self, v: f64) -> u16 {
        let v = match self {
            Rounding::HalfEven => v.round_ties_even(),
            Rounding::Truncate => v.trunc(),
        };
        // Interpolation stays within the band's AQI range, so this cannot saturate.
        v as u16
    }
}

/// The AQI and health advisory for a PM2.5 reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub aqi: u16,
    pub category: Category,
    pub sensitive_group: &'static str,
    pub health_effect: &'static str,
    pub cautionary: &'static str,
}

/// A value that can be read as a PM2.5 concentration in µg/m³.
///
/// Implemented for the primitive numeric types, for numeric strings,
/// and for Option of any of those (None is an invalid reading).
pub trait Pm25 {
    fn pm25(self) -> Result<f64, ClassifyError>;
}

macro_rules! lossless_pm25 {
    ($($t:ty),*) => {
        $(impl Pm25 for $t {
            fn pm25(self) -> Result<f64, ClassifyError> {
                Ok(f64::from(self))
            }
        })*
    };
}

lossless_pm25!(f64, f32, i8, i16, i32, u8, u16, u32);

macro_rules! wide_pm25 {
    ($($t:ty),*) => {
        $(impl Pm25 for $t {
            fn pm25(self) -> Result<f64, ClassifyError> {
                // Anything too large for exact f64 representation is out of range anyway.
                Ok(self as f64)
            }
        })*
    };
}

wide_pm25!(i64, u64, isize, usize);

impl Pm25 for &str {
    fn pm25(self) -> Result<f64, ClassifyError> {
        self.trim()
            .parse::<f64>()
            .map_err(|_| ClassifyError::InvalidInput)
    }
}

impl Pm25 for &String {
    fn pm25(self) -> Result<f64, ClassifyError> {
        self.as_str().pm25()
    }
}

impl Pm25 for String {
    fn pm25(self) -> Result<f64, ClassifyError> {
        self.as_str().pm25()
    }
}

impl<T: Pm25> Pm25 for Option<T> {
    fn pm25(self) -> Result<f64, ClassifyError> {
        self.ok_or(ClassifyError::InvalidInput)?.pm25()
    }
}

/// Classify a PM2.5 reading, rounding the AQI half-to-even.
pub fn classify(reading: impl Pm25) -> Result<Classification, ClassifyError> {
    classify_with(reading, Rounding::HalfEven)
}

/// Classify a PM2.5 reading with the given rounding policy.
pub fn classify_with(
    reading: impl Pm25,
    rounding: Rounding,
) -> Result<Classification, ClassifyError> {
    let pm25 = reading.pm25()?;
    let band = band_for(pm25).ok_or(ClassifyError::OutOfRange(pm25))?;
    let aqi = rounding.apply(band.interpolate(pm25));
    tracing::trace!("PM2.5 {pm25} => AQI {aqi} ({})", band.category);

    Ok(Classification {
        aqi,
        category: band.category,
        sensitive_group: band.advisory.sensitive_group,
        health_effect: band.advisory.health_effect,
        cautionary: band.advisory.cautionary,
    })
}
