use chrono::NaiveDateTime;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Timestamp format used by `weather_dates.date` and the backfill report
pub const WEATHER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Database entity models
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct WeatherDate {
    pub id: i32,
    pub date: NaiveDateTime,
}

/// A `gbt_weather` row missing a value, joined with its weather date
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct NullColumnRow {
    pub id: i32,
    pub date: NaiveDateTime,
}

// Import results
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedWeather {
    pub weather_date_id: i32,
    pub wind_speed: f64,
    pub irradiance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackfilledValue {
    pub id: i32,
    pub date: NaiveDateTime,
    pub value: f64,
}

/// Nullable measurement columns of `gbt_weather`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherColumn {
    WindSpeed,
    Irradiance,
}

impl WeatherColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherColumn::WindSpeed => "wind_speed",
            WeatherColumn::Irradiance => "irradiance",
        }
    }

    pub const fn all() -> &'static [WeatherColumn] {
        &[WeatherColumn::WindSpeed, WeatherColumn::Irradiance]
    }
}

impl fmt::Display for WeatherColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Unknown weather column '{0}'. Supported columns: wind_speed, irradiance")]
pub struct ParseColumnError(pub String);

impl FromStr for WeatherColumn {
    type Err = ParseColumnError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "wind_speed" => Ok(WeatherColumn::WindSpeed),
            "irradiance" => Ok(WeatherColumn::Irradiance),
            other => Err(ParseColumnError(other.to_string())),
        }
    }
}
