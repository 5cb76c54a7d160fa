//! An air-quality monitor.
//!
//! Polls a weather station for its latest PM2.5 reading, converts it to a
//! US EPA AQI with [aqi::classify], and reports it along with the station's
//! other readings.
//!
//! # Configuration
//! Requires an Ambient Weather API key and application key, either in
//! the config file (see [config::Config]) or in the environment.
//!
use std::time::Duration;

pub mod config;
pub mod context;
pub mod history;
pub mod report;
pub mod station;

use aqi::{Classification, ClassifyError};
use context::Context;
use history::History;
use station::{StationError, StationSample, StationSampler};

/// The result of one refresh: a station sample and, if it had a PM2.5 reading, its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub sample: StationSample,
    pub classification: Option<Result<Classification, ClassifyError>>,
}

/// Samples a station and keeps the recent PM2.5 history.
pub struct Monitor<S> {
    sampler: S,
    history: History,
}

impl<S: StationSampler> Monitor<S> {
    pub fn new(sampler: S, history: History) -> Self {
        Self { sampler, history }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Take a sample, classify its PM2.5 reading, and record the reading.
    pub fn refresh(&mut self) -> Result<Observation, StationError> {
        let sample = self.sampler.sample()?;
        let classification = sample.pm25.as_ref().map(|pm| {
            self.history.push(pm.value);
            aqi::classify(pm.value)
        });
        match &classification {
            Some(Ok(c)) => tracing::info!("AQI {} ({})", c.aqi, c.category),
            Some(Err(e)) => tracing::warn!("could not classify PM2.5 reading: {}", e),
            None => tracing::warn!("station sample has no PM2.5 reading"),
        }
        Ok(Observation {
            sample,
            classification,
        })
    }
}

/// Refresh routine.
///
/// Refreshes every `interval` until the context is cancelled,
/// handing each outcome and the updated history to `sink`.
/// A failed refresh is reported and retried at the next interval.
pub fn run<S, F>(ctx: &Context, monitor: &mut Monitor<S>, interval: Duration, mut sink: F)
where
    S: StationSampler,
    F: FnMut(&Result<Observation, StationError>, &History),
{
    while !ctx.is_cancelled() {
        tracing::debug!("refreshing station data");
        let outcome = monitor.refresh();
        if let Err(e) = &outcome {
            tracing::error!("fetch failed: {}", e);
        }
        sink(&outcome, monitor.history());

        if ctx.wait_timeout(interval) {
            break;
        }
    }
    tracing::info!("refresh loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::{FakeSampler, Pm25Reading};
    use pretty_assertions::assert_eq;

    fn sample_with(pm25: f64) -> StationSample {
        StationSample {
            pm25: Some(Pm25Reading {
                value: pm25,
                source: "pm25".to_owned(),
            }),
            ..Default::default()
        }
    }

    /// Plays back a script of outcomes, cancelling the context at the end.
    struct Scripted {
        ctx: Context,
        script: Vec<Result<StationSample, StationError>>,
    }

    impl StationSampler for Scripted {
        fn sample(&mut self) -> Result<StationSample, StationError> {
            let next = self.script.remove(0);
            if self.script.is_empty() {
                self.ctx.cancel();
            }
            next
        }
    }

    #[test]
    fn refresh_classifies_and_records() {
        let mut m = Monitor::new(
            FakeSampler {
                sample: sample_with(35.5),
            },
            History::new(5),
        );
        let obs = m.refresh().unwrap();
        let c = obs.classification.unwrap().unwrap();
        assert_eq!(c.aqi, 101);
        assert_eq!(c.category, aqi::Category::UnhealthyForSensitiveGroups);
        assert_eq!(m.history().len(), 1);
    }

    #[test]
    fn refresh_without_pm25() {
        let mut m = Monitor::new(
            FakeSampler {
                sample: StationSample::default(),
            },
            History::default(),
        );
        let obs = m.refresh().unwrap();
        assert_eq!(obs.classification, None);
        assert!(m.history().is_empty());
    }

    #[test]
    fn refresh_out_of_range_is_reported() {
        let mut m = Monitor::new(
            FakeSampler {
                sample: sample_with(612.0),
            },
            History::default(),
        );
        let obs = m.refresh().unwrap();
        assert_eq!(
            obs.classification,
            Some(Err(ClassifyError::OutOfRange(612.0)))
        );
        // Still charted: it's what the station said.
        assert_eq!(m.history().len(), 1);
    }

    #[test]
    fn run_survives_failures_until_cancelled() {
        let ctx = Context::new();
        let sampler = Scripted {
            ctx: ctx.clone(),
            script: vec![
                Ok(sample_with(10.0)),
                Err(StationError::NoDevices),
                Ok(sample_with(40.0)),
            ],
        };
        let mut m = Monitor::new(sampler, History::default());

        let mut seen = Vec::new();
        run(&ctx, &mut m, Duration::ZERO, |outcome, history| {
            let aqi = outcome
                .as_ref()
                .ok()
                .and_then(|o| o.classification.clone())
                .and_then(Result::ok)
                .map(|c| c.aqi);
            seen.push((aqi, history.len()));
        });

        assert_eq!(seen, vec![(Some(42), 1), (None, 1), (Some(112), 2)]);
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn run_does_nothing_when_cancelled() {
        let ctx = Context::new();
        ctx.cancel();
        let mut m = Monitor::new(
            FakeSampler {
                sample: sample_with(1.0),
            },
            History::default(),
        );
        let mut calls = 0;
        run(&ctx, &mut m, Duration::from_secs(3600), |_, _| calls += 1);
        assert_eq!(calls, 0);
    }
}
