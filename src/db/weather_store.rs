use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::db::{DbError, NullColumnRow, WeatherColumn, WeatherDate};

/// Storage operations the importer needs from the weather tables.
///
/// Each call is its own statement; implementations must not wrap several
/// calls in a shared transaction.
#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Weather dates at or before `as_of` that have no `gbt_weather` row
    async fn find_missing_dates(&self, as_of: NaiveDateTime) -> Result<Vec<WeatherDate>, DbError>;

    /// Create the single weather row for `weather_date_id`
    async fn insert(
        &self,
        weather_date_id: i32,
        wind_speed: Option<f64>,
        irradiance: Option<f64>,
    ) -> Result<(), DbError>;

    /// Weather rows whose `column` is NULL
    async fn find_null_column(&self, column: WeatherColumn) -> Result<Vec<NullColumnRow>, DbError>;

    async fn update_column(
        &self,
        row_id: i32,
        column: WeatherColumn,
        value: f64,
    ) -> Result<(), DbError>;
}
