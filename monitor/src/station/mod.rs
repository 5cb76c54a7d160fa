//! Types for surfacing weather-station data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod ambient;
pub mod conditions;

use conditions::{Condition, UvLevel};

/// An error in getting a sample from a weather station.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    #[error("could not reach the station service: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status}")]
    Api { status: u16 },
    #[error("No devices found.")]
    NoDevices,
    #[error("device {0} not found on this account")]
    DeviceNotFound(String),
    #[error("No data received from the station.")]
    NoData,
    #[error("could not decode the station response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The station that produced a sample.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub mac_address: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
}

/// A PM2.5 concentration reported by a station.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pm25Reading {
    /// Concentration in µg/m³.
    pub value: f64,
    /// The station data field this reading came from.
    pub source: String,
}

/// A sample of the conditions at a weather station.
///
/// For instance, consider an [Ambient Weather](https://ambientweather.docs.apiary.io/)
/// station with an outdoor or indoor particulate monitor attached.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StationSample {
    /// Time at which this sample was acquired.
    pub timestamp: DateTime<Utc>,

    /// Time at which the station recorded the data, if it said.
    pub observed: Option<DateTime<Utc>>,

    pub device: Option<DeviceInfo>,

    /// PM2.5 concentration, if the station has a particulate sensor.
    pub pm25: Option<Pm25Reading>,

    pub weather: Weather,
}

/// Weather readings, in the station's US customary units.
///
/// Field names on the wire are the Ambient Weather ones.
/// Any field may be missing, depending on which sensors the station has.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    /// Outdoor temperature, °F.
    #[serde(rename = "tempf", deserialize_with = "lenient_f64")]
    pub temp_f: Option<f64>,
    /// Outdoor relative humidity, percent.
    #[serde(rename = "humidity", deserialize_with = "lenient_f64")]
    pub humidity: Option<f64>,
    /// Relative barometric pressure, inHg.
    #[serde(rename = "baromrelin", deserialize_with = "lenient_f64")]
    pub barom_rel_in: Option<f64>,
    /// Absolute barometric pressure, inHg.
    #[serde(rename = "baromabsin", deserialize_with = "lenient_f64")]
    pub barom_abs_in: Option<f64>,
    #[serde(rename = "windspeedmph", deserialize_with = "lenient_f64")]
    pub wind_speed_mph: Option<f64>,
    #[serde(rename = "windgustmph", deserialize_with = "lenient_f64")]
    pub wind_gust_mph: Option<f64>,
    /// Wind direction, degrees.
    #[serde(rename = "winddir", deserialize_with = "lenient_f64")]
    pub wind_dir: Option<f64>,
    #[serde(rename = "maxdailygust", deserialize_with = "lenient_f64")]
    pub max_daily_gust_mph: Option<f64>,
    /// Rain rate, inches per hour.
    #[serde(rename = "hourlyrainin", deserialize_with = "lenient_f64")]
    pub hourly_rain_in: Option<f64>,
    #[serde(rename = "dailyrainin", deserialize_with = "lenient_f64")]
    pub daily_rain_in: Option<f64>,
    #[serde(rename = "weeklyrainin", deserialize_with = "lenient_f64")]
    pub weekly_rain_in: Option<f64>,
    #[serde(rename = "monthlyrainin", deserialize_with = "lenient_f64")]
    pub monthly_rain_in: Option<f64>,
    #[serde(rename = "yearlyrainin", deserialize_with = "lenient_f64")]
    pub yearly_rain_in: Option<f64>,
    /// Solar radiation, W/m².
    #[serde(rename = "solarradiation", deserialize_with = "lenient_f64")]
    pub solar_radiation: Option<f64>,
    #[serde(rename = "uv", deserialize_with = "lenient_f64")]
    pub uv_index: Option<f64>,
    #[serde(rename = "tempinf", deserialize_with = "lenient_f64")]
    pub indoor_temp_f: Option<f64>,
    #[serde(rename = "humidityin", deserialize_with = "lenient_f64")]
    pub indoor_humidity: Option<f64>,
    #[serde(rename = "pm25_in", deserialize_with = "lenient_f64")]
    pub indoor_pm25: Option<f64>,
    #[serde(rename = "pm25_in_24h", deserialize_with = "lenient_f64")]
    pub indoor_pm25_24h: Option<f64>,
    #[serde(rename = "feelsLike", deserialize_with = "lenient_f64")]
    pub feels_like_f: Option<f64>,
    #[serde(rename = "dewPoint", deserialize_with = "lenient_f64")]
    pub dew_point_f: Option<f64>,
    #[serde(rename = "feelsLikein", deserialize_with = "lenient_f64")]
    pub indoor_feels_like_f: Option<f64>,
    #[serde(rename = "dewPointin", deserialize_with = "lenient_f64")]
    pub indoor_dew_point_f: Option<f64>,
}

impl Weather {
    /// Best guess at the current sky conditions.
    pub fn condition(&self) -> Condition {
        Condition::infer(
            self.temp_f,
            self.hourly_rain_in,
            self.daily_rain_in,
            self.solar_radiation,
        )
    }

    pub fn uv_level(&self) -> Option<UvLevel> {
        self.uv_index.map(UvLevel::from_index)
    }
}

/// Accept a number or a numeric string; anything else reads as missing.
/// A single odd field should not cost us the rest of the sample.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A type that can get the current conditions at a weather station.
pub trait StationSampler {
    /// Get a current / latest sample.
    ///
    /// A sample may be partial: stations only report the sensors they have.
    fn sample(&mut self) -> Result<StationSample, StationError>;
}

impl<S: StationSampler + ?Sized> StationSampler for Box<S> {
    fn sample(&mut self) -> Result<StationSample, StationError> {
        (**self).sample()
    }
}

/// The nullary StationSampler: provides no data.
pub struct NullSampler {}

impl StationSampler for NullSampler {
    fn sample(&mut self) -> Result<StationSample, StationError> {
        Ok(StationSample {
            timestamp: Utc::now(),
            ..Default::default()
        })
    }
}

/// Fake station sampler: repeatedly provides the indicated sample.
pub struct FakeSampler {
    pub sample: StationSample,
}

impl StationSampler for FakeSampler {
    fn sample(&mut self) -> Result<StationSample, StationError> {
        Ok(self.sample.clone())
    }
}
