use chrono::{Local, NaiveDateTime, Utc};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::db::{
    BackfilledValue, DbError, NullColumnRow, PopulatedWeather, WeatherColumn, WeatherDate,
    WeatherStore,
};
use crate::report::BackfillReport;
use crate::sampler::{SamplerError, SamplerSource};

/// Error types for weather import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Sampler error: {0}")]
    Sampler(#[from] SamplerError),

    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),

    #[error("No {column} measurement for weather date {weather_date_id} at {date}")]
    NoMeasurement {
        weather_date_id: i32,
        column: WeatherColumn,
        date: NaiveDateTime,
    },
}

/// Keep a sampled value only if it is a real measurement.
///
/// Zero is treated as "no measurement" unless `accept_zero` is set.
pub fn usable_measurement(value: Option<f64>, accept_zero: bool) -> Option<f64> {
    value.filter(|v| v.is_finite() && (accept_zero || *v != 0.0))
}

/// Fills `gbt_weather` from the wind and irradiance sampler logs
pub struct WeatherImportService<S, W, I> {
    store: S,
    wind: W,
    irradiance: I,
    accept_zero: bool,
}

impl<S: WeatherStore> WeatherImportService<S, (), ()> {
    /// Importer for the store-only operations; lookups and backfills need
    /// samplers and are unavailable
    pub fn for_store(store: S) -> Self {
        Self::new(store, (), ())
    }
}

impl<S: WeatherStore, W, I> WeatherImportService<S, W, I> {
    pub fn new(store: S, wind: W, irradiance: I) -> Self {
        Self {
            store,
            wind,
            irradiance,
            accept_zero: false,
        }
    }

    /// Let backfills write genuine zero readings instead of skipping them
    pub fn with_accept_zero(mut self, accept_zero: bool) -> Self {
        self.accept_zero = accept_zero;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Weather dates at or before `as_of` (default: now, UTC) without weather data
    pub async fn find_missing_dates(
        &self,
        as_of: Option<NaiveDateTime>,
    ) -> Result<Vec<WeatherDate>, ImportError> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().naive_utc());
        Ok(self.store.find_missing_dates(as_of).await?)
    }

    pub async fn insert(
        &self,
        weather_date_id: i32,
        wind_speed: Option<f64>,
        irradiance: Option<f64>,
    ) -> Result<(), ImportError> {
        Ok(self
            .store
            .insert(weather_date_id, wind_speed, irradiance)
            .await?)
    }

    pub async fn find_null_column(
        &self,
        column: WeatherColumn,
    ) -> Result<Vec<NullColumnRow>, ImportError> {
        Ok(self.store.find_null_column(column).await?)
    }

    pub async fn update_column(
        &self,
        row_id: i32,
        column: WeatherColumn,
        value: f64,
    ) -> Result<(), ImportError> {
        Ok(self.store.update_column(row_id, column, value).await?)
    }

    /// Fill NULL values of `column` from `source`, skipping unusable samples
    #[instrument(skip(self, source), fields(column = %column))]
    pub async fn backfill<T>(
        &self,
        column: WeatherColumn,
        source: &T,
    ) -> Result<Vec<BackfilledValue>, ImportError>
    where
        T: SamplerSource + ?Sized,
    {
        let missing = self.find_null_column(column).await?;
        info!("Backfilling {} rows missing {}", missing.len(), column);

        let mut results = Vec::new();
        for row in missing {
            let sampled = source.last_hour_median(row.date)?;
            let Some(value) = usable_measurement(sampled, self.accept_zero) else {
                debug!(
                    "No usable {} for row {} at {} (sampled {:?})",
                    column, row.id, row.date, sampled
                );
                continue;
            };

            self.update_column(row.id, column, value).await?;
            results.push(BackfilledValue {
                id: row.id,
                date: row.date,
                value,
            });
        }

        info!("Backfilled {} {} values", results.len(), column);
        Ok(results)
    }
}

impl<S, W, I> WeatherImportService<S, W, I>
where
    S: WeatherStore,
    W: SamplerSource,
    I: SamplerSource,
{
    /// Create weather rows for every weather date that lacks one.
    ///
    /// Stops at the first store or sampler failure, and at the first date
    /// either sampler has no finite measurement for. Rows inserted before the
    /// failure remain.
    #[instrument(skip(self))]
    pub async fn populate(&self) -> Result<Vec<PopulatedWeather>, ImportError> {
        let dates = self.find_missing_dates(None).await?;
        info!("Populating weather for {} dates", dates.len());

        let mut results = Vec::with_capacity(dates.len());
        for date in dates {
            let wind_speed = Self::sample(&self.wind, WeatherColumn::WindSpeed, &date)?;
            let irradiance = Self::sample(&self.irradiance, WeatherColumn::Irradiance, &date)?;

            self.insert(date.id, Some(wind_speed), Some(irradiance))
                .await?;
            results.push(PopulatedWeather {
                weather_date_id: date.id,
                wind_speed,
                irradiance,
            });
        }

        info!("Inserted {} weather rows", results.len());
        Ok(results)
    }

    fn sample<T: SamplerSource>(
        source: &T,
        column: WeatherColumn,
        date: &WeatherDate,
    ) -> Result<f64, ImportError> {
        source
            .last_hour_median(date.date)?
            .filter(|v| v.is_finite())
            .ok_or(ImportError::NoMeasurement {
                weather_date_id: date.id,
                column,
                date: date.date,
            })
    }

    pub async fn backfill_wind(&self) -> Result<Vec<BackfilledValue>, ImportError> {
        self.backfill(WeatherColumn::WindSpeed, &self.wind).await
    }

    pub async fn backfill_irradiance(&self) -> Result<Vec<BackfilledValue>, ImportError> {
        self.backfill(WeatherColumn::Irradiance, &self.irradiance)
            .await
    }

    /// Backfill irradiance and write a report of the filled rows to `path`.
    ///
    /// Wind is not backfilled here: the sampler archive lacks historical wind
    /// coverage for most weather dates.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn backfill_report(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<BackfillReport, ImportError> {
        let started_at = Local::now();
        let entries = self.backfill_irradiance().await?;
        let report = BackfillReport {
            title: "Irradiance".to_string(),
            started_at,
            entries,
            finished_at: Local::now(),
        };

        report.write_to(path.as_ref())?;
        info!("Printed report to: {}", path.as_ref().display());
        Ok(report)
    }
}
