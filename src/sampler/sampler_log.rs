use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::db::WEATHER_DATE_FORMAT;
use crate::sampler::{SamplerError, SamplerSource};

/// One row of a sampler log CSV (`timestamp,value`)
#[derive(Debug, Deserialize)]
struct SampleRecord {
    timestamp: String,
    value: Option<f64>,
}

/// Sensor samples loaded from a CSV sampler log.
///
/// Empty and NaN values are dropped at load time, so every stored sample is
/// a real measurement.
#[derive(Debug, Clone)]
pub struct SamplerLog {
    samples: Vec<(NaiveDateTime, f64)>,
    window: Duration,
}

impl SamplerLog {
    pub fn new(mut samples: Vec<(NaiveDateTime, f64)>, window: Duration) -> Self {
        samples.retain(|(_, value)| !value.is_nan());
        samples.sort_by_key(|(timestamp, _)| *timestamp);
        Self { samples, window }
    }

    /// Load a sampler log with a `timestamp,value` header.
    ///
    /// # Expected Format:
    /// ```text
    /// timestamp,value
    /// 2020-01-01 08:10:00,3.1
    /// 2020-01-01 08:20:00,
    /// 2020-01-01 08:30:00,NaN
    /// ```
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>, window: Duration) -> Result<Self, SamplerError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let mut samples = Vec::new();
        let mut skipped = 0;

        for (index, record) in reader.deserialize::<SampleRecord>().enumerate() {
            // Header occupies line 1
            let line = index + 2;
            let record = record?;

            let timestamp = NaiveDateTime::parse_from_str(&record.timestamp, WEATHER_DATE_FORMAT)
                .map_err(|e| SamplerError::Parse {
                    line,
                    message: format!("bad timestamp '{}': {e}", record.timestamp),
                })?;

            match record.value {
                Some(value) if !value.is_nan() => samples.push((timestamp, value)),
                _ => skipped += 1,
            }
        }

        info!(
            "Loaded {} samples from sampler log ({} empty or NaN skipped)",
            samples.len(),
            skipped
        );
        Ok(Self::new(samples, window))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in `(at - window, at]`
    fn window_values(&self, at: NaiveDateTime) -> Vec<f64> {
        let start = at - self.window;
        let first = self.samples.partition_point(|(t, _)| *t <= start);
        let last = self.samples.partition_point(|(t, _)| *t <= at);

        if first >= last {
            return Vec::new();
        }
        self.samples[first..last].iter().map(|(_, v)| *v).collect()
    }
}

impl SamplerSource for SamplerLog {
    fn last_hour_median(&self, at: NaiveDateTime) -> Result<Option<f64>, SamplerError> {
        let mut values = self.window_values(at);
        let median = median(&mut values);
        debug!("Median of {} samples before {}: {:?}", values.len(), at, median);
        Ok(median)
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
