//! Rendering of classifications and station observations, as text or JSON.

use std::fmt::Write;

use aqi::{Classification, ClassifyError};
use serde_json::json;

use crate::{history::History, station::StationSample, Observation};

const MISSING: &str = "--";

/// Health advisory lines for a classification.
pub fn advisory(c: &Classification) -> String {
    format!(
        "Category: {}\nSensitive Groups: {}\nHealth Effects: {}\nCautionary: {}",
        c.category, c.sensitive_group, c.health_effect, c.cautionary
    )
}

/// AQI line and advisory, or the reason there is none.
pub fn classification(result: &Result<Classification, ClassifyError>) -> String {
    match result {
        Ok(c) => format!("AQI: {}\n{}", c.aqi, advisory(c)),
        Err(e) => format!("AQI: {e}"),
    }
}

fn value(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_owned(), |v| format!("{v}"))
}

fn with_unit(v: Option<f64>, unit: &str) -> String {
    v.map_or_else(|| MISSING.to_owned(), |v| format!("{v}{unit}"))
}

/// Weather lines for a station sample.
pub fn weather(sample: &StationSample) -> String {
    let w = &sample.weather;
    let uv = match w.uv_level() {
        Some(level) => format!("{} ({level})", value(w.uv_index)),
        None => MISSING.to_owned(),
    };
    // Writing to a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Outdoor: {}, {}",
        with_unit(w.temp_f, " °F"),
        with_unit(w.humidity, "%")
    );
    let _ = writeln!(
        out,
        "Indoor: {}, {}",
        with_unit(w.indoor_temp_f, " °F"),
        with_unit(w.indoor_humidity, "%")
    );
    let _ = writeln!(
        out,
        "Feels like: {}, dew point {}",
        with_unit(w.feels_like_f, " °F"),
        with_unit(w.dew_point_f, " °F")
    );
    let _ = writeln!(
        out,
        "Wind: {} (gust {}, from {})",
        with_unit(w.wind_speed_mph, " mph"),
        with_unit(w.wind_gust_mph, " mph"),
        with_unit(w.wind_dir, "°")
    );
    let _ = writeln!(
        out,
        "Rain: {} today, {} this hour",
        with_unit(w.daily_rain_in, " in"),
        with_unit(w.hourly_rain_in, " in")
    );
    let _ = writeln!(out, "Pressure: {}", with_unit(w.barom_rel_in, " inHg"));
    let _ = writeln!(out, "UV: {uv}");
    let _ = writeln!(out, "Solar: {}", with_unit(w.solar_radiation, " W/m²"));
    let _ = write!(out, "Conditions: {}", w.condition());
    out
}

/// One-line summary of a refresh.
pub fn status(obs: &Observation) -> String {
    let date = obs
        .sample
        .observed
        .map_or_else(|| "N/A".to_owned(), |t| t.to_rfc3339());
    match (&obs.sample.pm25, &obs.classification) {
        (Some(pm), Some(Ok(c))) => format!(
            "Refreshed: PM2.5 ({}) {:.1} µg/m³ at {date}. AQI: {}.",
            pm.source, pm.value, c.aqi
        ),
        (Some(pm), Some(Err(e))) => format!(
            "Refreshed: PM2.5 ({}) {:.1} µg/m³ at {date}. AQI: {e}",
            pm.source, pm.value
        ),
        _ => format!("PM2.5 data not found in latest report from {date}."),
    }
}

/// Full text report for an observation.
pub fn observation(obs: &Observation) -> String {
    let mut out = String::new();
    match &obs.sample.pm25 {
        Some(pm) => {
            let _ = writeln!(out, "PM2.5: {:.1} µg/m³", pm.value);
        }
        None => {
            let _ = writeln!(out, "PM2.5: Not Available");
        }
    }
    match &obs.classification {
        Some(result) => {
            let _ = writeln!(out, "{}", classification(result));
        }
        None => {
            let _ = writeln!(out, "AQI: {MISSING}");
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", weather(&obs.sample));
    let _ = write!(out, "{}", status(obs));
    out
}

/// Chart of recent readings: the sparkline and its range.
pub fn chart(history: &History) -> String {
    if history.is_empty() {
        return "PM2.5 history: no readings yet".to_owned();
    }
    let (lo, hi) = history.y_bounds();
    format!(
        "PM2.5 history ({} readings, {lo:.1}–{hi:.1} µg/m³): {}",
        history.len(),
        history.sparkline()
    )
}

/// Machine-readable form of a classification.
pub fn classification_to_json(result: &Result<Classification, ClassifyError>) -> serde_json::Value {
    match result {
        Ok(c) => json!(c),
        Err(e) => json!({ "error": e.to_string() }),
    }
}

/// Machine-readable form of an observation.
pub fn observation_to_json(obs: &Observation) -> serde_json::Value {
    let w = &obs.sample.weather;
    json!({
        "sample": obs.sample,
        "classification": obs.classification.as_ref().map(classification_to_json),
        "condition": w.condition(),
        "uv_level": w.uv_level(),
    })
}
