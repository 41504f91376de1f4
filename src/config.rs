use chrono::Duration;
use std::env;
use std::path::PathBuf;

const DEFAULT_SAMPLER_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub wind_sampler_log: PathBuf,
    pub irradiance_sampler_log: PathBuf,
    pub sampler_window_minutes: i64,
    pub backfill_accept_zero: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Self::from_vars(|key| env::var(key))
    }

    fn from_vars<F>(var: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        Ok(Config {
            wind_sampler_log: var("WIND_SAMPLER_LOG")?.into(),
            irradiance_sampler_log: var("IRRADIANCE_SAMPLER_LOG")?.into(),
            sampler_window_minutes: var("SAMPLER_WINDOW_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|minutes| window_from_minutes(*minutes).is_some())
                .unwrap_or(DEFAULT_SAMPLER_WINDOW_MINUTES),
            backfill_accept_zero: var("BACKFILL_ACCEPT_ZERO")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }

    pub fn sampler_window(&self) -> Duration {
        window_from_minutes(self.sampler_window_minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_SAMPLER_WINDOW_MINUTES))
    }
}

/// A sampler window must be positive and representable as a `Duration`
fn window_from_minutes(minutes: i64) -> Option<Duration> {
    Duration::try_minutes(minutes).filter(|window| *window > Duration::zero())
}
