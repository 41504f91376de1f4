//! Sampler sources: external sensor logs queried for the median reading
//! over the window preceding a weather date.

pub mod sampler_log;

use chrono::NaiveDateTime;

pub use sampler_log::SamplerLog;

#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("Failed to read sampler log: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse sampler log: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid sample at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// A sensor whose samples can be summarised per weather date.
///
/// `Ok(None)` means the sensor has no samples in the window; implementations
/// may also return NaN, which callers treat the same way.
pub trait SamplerSource: Send + Sync {
    fn last_hour_median(&self, at: NaiveDateTime) -> Result<Option<f64>, SamplerError>;
}

impl<T: SamplerSource + ?Sized> SamplerSource for &T {
    fn last_hour_median(&self, at: NaiveDateTime) -> Result<Option<f64>, SamplerError> {
        (**self).last_hour_median(at)
    }
}
