//! Get station data from the Ambient Weather REST API.
//!
//! Notes from https://ambientweather.docs.apiary.io/:
//!
//! - /v1/devices?apiKey=..&applicationKey=.. returns:
//!     - a list of the account's devices, each with .macAddress, .info.{name,location}
//!     - ...and .lastData, the most recent report, keyed by sensor field
//!       (tempf, humidity, pm25, pm25_in, ...)
//!     - .lastData.date is an ISO-8601 timestamp; .lastData.dateutc is epoch millis
//! - /v1/devices/{macAddress} returns historic data; we don't need it.
//! - Rate limit is 1 request/second per API key, so the refresh loop is far below it.
//!
//! Which PM2.5 field is present depends on the monitor attached:
//! the outdoor PM2.5 sensor reports `pm25`, the indoor one `pm25_in`,
//! and third-party integrations have used a handful of other names.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{DeviceInfo, Pm25Reading, StationError, StationSample, StationSampler, Weather};
use crate::config::{AmbientConfig, Credentials};

/// Fields that may carry a PM2.5 concentration, in order of preference.
pub const PM25_KEYS: [&str; 12] = [
    "pm25",
    "PM25",
    "pm2_5",
    "pm25_in",
    "PM25_in",
    "pm25_indoor",
    "pm25outdoor",
    "PM25outdoor",
    "pm25_24h_avg",
    "pm25avg",
    "pm25conc",
    "pm25concentration",
];

const TIMEOUT: Duration = Duration::from_secs(15);

/// Sampler backed by an Ambient Weather account.
pub struct AmbientSampler {
    http: reqwest::blocking::Client,
    url: String,
    credentials: Credentials,
    device: Option<String>,
}

impl AmbientSampler {
    pub fn new(credentials: Credentials, config: &AmbientConfig) -> Result<Self, StationError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let url = format!("{}/v1/devices", config.endpoint.trim_end_matches('/'));
        Ok(Self {
            http,
            url,
            credentials,
            device: config.device.clone(),
        })
    }

    /// Fetch the raw device list.
    fn fetch(&self) -> Result<String, StationError> {
        tracing::debug!("fetching devices from {}", self.url);
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("apiKey", self.credentials.api_key.as_str()),
                ("applicationKey", self.credentials.app_key.as_str()),
            ])
            .send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(StationError::Api {
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}

impl StationSampler for AmbientSampler {
    fn sample(&mut self) -> Result<StationSample, StationError> {
        let body = self.fetch()?;
        parse_devices(&body, self.device.as_deref(), Utc::now())
    }
}

#[derive(Deserialize)]
struct Device {
    #[serde(rename = "macAddress")]
    mac_address: Option<String>,
    #[serde(default)]
    info: DeviceMeta,
    #[serde(rename = "lastData")]
    last_data: Option<Map<String, Value>>,
}

#[derive(Default, Deserialize)]
struct DeviceMeta {
    name: Option<String>,
    location: Option<String>,
}

/// Interpret a /v1/devices response.
///
/// Picks the device with the given MAC address, or the first device if none is given.
pub fn parse_devices(
    body: &str,
    device: Option<&str>,
    now: DateTime<Utc>,
) -> Result<StationSample, StationError> {
    let devices: Vec<Device> = serde_json::from_str(body)?;
    tracing::debug!("account has {} device(s)", devices.len());

    let device = match device {
        Some(mac) => devices
            .into_iter()
            .find(|d| {
                d.mac_address
                    .as_deref()
                    .is_some_and(|m| m.eq_ignore_ascii_case(mac))
            })
            .ok_or_else(|| StationError::DeviceNotFound(mac.to_owned()))?,
        None => devices.into_iter().next().ok_or(StationError::NoDevices)?,
    };

    let data = match device.last_data {
        Some(data) if !data.is_empty() => data,
        _ => return Err(StationError::NoData),
    };

    let pm25 = find_pm25(&data);
    if pm25.is_none() {
        let keys: Vec<&str> = data.keys().map(String::as_str).collect();
        tracing::warn!("no PM2.5 reading in station data; fields: {:?}", keys);
    }
    let observed = observed_at(&data);
    let weather: Weather = serde_json::from_value(Value::Object(data))?;

    Ok(StationSample {
        timestamp: now,
        observed,
        device: Some(DeviceInfo {
            mac_address: device.mac_address,
            name: device.info.name,
            location: device.info.location,
        }),
        pm25,
        weather,
    })
}

/// The first non-negative numeric PM2.5 field, in PM25_KEYS order.
fn find_pm25(data: &Map<String, Value>) -> Option<Pm25Reading> {
    PM25_KEYS.iter().find_map(|&key| {
        let value = data.get(key)?.as_f64()?;
        (value >= 0.0).then(|| Pm25Reading {
            value,
            source: key.to_owned(),
        })
    })
}

fn observed_at(data: &Map<String, Value>) -> Option<DateTime<Utc>> {
    if let Some(date) = data.get("date").and_then(Value::as_str) {
        if let Ok(t) = DateTime::parse_from_rfc3339(date) {
            return Some(t.with_timezone(&Utc));
        }
        tracing::debug!("unparseable station date {:?}", date);
    }
    data.get("dateutc")
        .and_then(Value::as_i64)
        .and_then(DateTime::from_timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    const TWO_DEVICES: &str = r#"[
        {
            "macAddress": "00:0E:C6:20:0F:7B",
            "info": {"name": "Backyard", "location": "Home"},
            "lastData": {
                "dateutc": 1717243200000,
                "date": "2024-06-01T12:00:00.000Z",
                "tempf": 78.5,
                "humidity": 58,
                "baromrelin": 29.92,
                "windspeedmph": 7.8,
                "hourlyrainin": 0,
                "dailyrainin": 0.12,
                "solarradiation": 650.2,
                "uv": 7,
                "tempinf": 71.2,
                "humidityin": 40,
                "pm25": 35.5,
                "pm25_24h": 20.1,
                "pm25_in": 4.0
            }
        },
        {
            "macAddress": "00:0e:c6:aa:bb:cc",
            "info": {"name": "Office"},
            "lastData": {"dateutc": 1717243260000, "pm25_in": 9.5, "tempinf": 70.0}
        }
    ]"#;

    #[test]
    fn first_device_by_default() {
        let s = parse_devices(TWO_DEVICES, None, now()).unwrap();
        assert_eq!(s.timestamp, now());
        assert_eq!(s.observed, Some(now()));
        assert_eq!(
            s.device,
            Some(DeviceInfo {
                mac_address: Some("00:0E:C6:20:0F:7B".to_owned()),
                name: Some("Backyard".to_owned()),
                location: Some("Home".to_owned()),
            })
        );
        assert_eq!(
            s.pm25,
            Some(Pm25Reading {
                value: 35.5,
                source: "pm25".to_owned()
            })
        );
        assert_eq!(s.weather.temp_f, Some(78.5));
        assert_eq!(s.weather.humidity, Some(58.0));
        assert_eq!(s.weather.indoor_pm25, Some(4.0));
        assert_eq!(s.weather.uv_index, Some(7.0));
        assert_eq!(s.weather.wind_gust_mph, None);
    }

    #[test]
    fn device_by_mac() {
        let s = parse_devices(TWO_DEVICES, Some("00:0E:C6:AA:BB:CC"), now()).unwrap();
        assert_eq!(s.device.unwrap().name.as_deref(), Some("Office"));
        // Only the indoor sensor; falls back to it.
        assert_eq!(
            s.pm25,
            Some(Pm25Reading {
                value: 9.5,
                source: "pm25_in".to_owned()
            })
        );
        // No ISO date; use the epoch millis.
        assert_eq!(s.observed, DateTime::from_timestamp_millis(1717243260000));
    }

    #[test]
    fn unknown_mac() {
        let err = parse_devices(TWO_DEVICES, Some("ff:ff:ff:ff:ff:ff"), now()).unwrap_err();
        assert!(matches!(err, StationError::DeviceNotFound(ref m) if m == "ff:ff:ff:ff:ff:ff"));
    }

    #[test]
    fn no_devices() {
        let err = parse_devices("[]", None, now()).unwrap_err();
        assert!(matches!(err, StationError::NoDevices));
        assert_eq!(err.to_string(), "No devices found.");
    }

    #[test]
    fn no_data() {
        let err = parse_devices(r#"[{"macAddress": "x"}]"#, None, now()).unwrap_err();
        assert!(matches!(err, StationError::NoData));
        let err = parse_devices(r#"[{"macAddress": "x", "lastData": {}}]"#, None, now()).unwrap_err();
        assert!(matches!(err, StationError::NoData));
    }

    #[test]
    fn malformed_response() {
        let err = parse_devices(r#"{"error": "apiKey-missing"}"#, None, now()).unwrap_err();
        assert!(matches!(err, StationError::Decode(_)));
    }

    #[test]
    fn pm25_search_skips_unusable_values() {
        let data = serde_json::json!({
            "pm25": -1,
            "PM25": "12",
            "pm2_5": null,
            "pm25_24h_avg": 15.5,
        });
        let data = data.as_object().unwrap();
        assert_eq!(
            find_pm25(data),
            Some(Pm25Reading {
                value: 15.5,
                source: "pm25_24h_avg".to_owned()
            })
        );
    }

    /// Serve one canned HTTP response on a local port; returns the endpoint
    /// and a handle yielding the request line it received.
    fn serve_once(
        status: &str,
        body: &str,
    ) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{BufRead, BufReader, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            request_line
        });
        (endpoint, handle)
    }

    fn sampler_for(endpoint: String) -> AmbientSampler {
        let config = AmbientConfig {
            endpoint,
            ..Default::default()
        };
        let credentials = Credentials {
            api_key: "api".to_owned(),
            app_key: "app".to_owned(),
        };
        AmbientSampler::new(credentials, &config).unwrap()
    }

    #[test]
    fn rejected_keys_report_status() {
        let (endpoint, server) = serve_once("401 Unauthorized", r#"{"error": "unauthorized"}"#);
        let err = sampler_for(endpoint).sample().unwrap_err();
        assert!(matches!(err, StationError::Api { status: 401 }), "{err:?}");

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /v1/devices?"), "{request}");
        assert!(request.contains("apiKey=api"), "{request}");
        assert!(request.contains("applicationKey=app"), "{request}");
    }

    #[test]
    fn fetches_and_parses() {
        let (endpoint, server) = serve_once("200 OK", TWO_DEVICES);
        let s = sampler_for(format!("{endpoint}/")).sample().unwrap();
        assert_eq!(s.pm25.map(|p| p.value), Some(35.5));
        server.join().unwrap();
    }

    #[test]
    fn sample_without_pm25() {
        let body = r#"[{"lastData": {"tempf": 60.1}}]"#;
        let s = parse_devices(body, None, now()).unwrap();
        assert_eq!(s.pm25, None);
        assert_eq!(s.weather.temp_f, Some(60.1));
        assert_eq!(s.observed, None);
    }
}
