// Shared fixtures for importer tests: an in-memory weather store and
// scripted sampler sources.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Mutex;

use weather_importer::db::{
    DbError, NullColumnRow, WeatherColumn, WeatherDate, WeatherStore, WEATHER_DATE_FORMAT,
};
use weather_importer::sampler::{SamplerError, SamplerSource};

pub fn dt(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, WEATHER_DATE_FORMAT).expect("valid test timestamp")
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: i32,
    pub weather_date_id: i32,
    pub wind_speed: Option<f64>,
    pub irradiance: Option<f64>,
}

#[derive(Default)]
struct State {
    dates: Vec<WeatherDate>,
    rows: Vec<StoredRow>,
    updates: usize,
}

/// `weather_dates` and `gbt_weather` held in memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn with_dates(dates: &[(i32, &str)]) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().dates = dates
            .iter()
            .map(|(id, date)| WeatherDate {
                id: *id,
                date: dt(date),
            })
            .collect();
        store
    }

    pub fn add_row(
        &self,
        id: i32,
        weather_date_id: i32,
        wind_speed: Option<f64>,
        irradiance: Option<f64>,
    ) {
        self.state.lock().unwrap().rows.push(StoredRow {
            id,
            weather_date_id,
            wind_speed,
            irradiance,
        });
    }

    pub fn rows(&self) -> Vec<StoredRow> {
        self.state.lock().unwrap().rows.clone()
    }

    pub fn row(&self, id: i32) -> Option<StoredRow> {
        self.rows().into_iter().find(|row| row.id == id)
    }

    pub fn rows_for_date(&self, weather_date_id: i32) -> Vec<StoredRow> {
        self.rows()
            .into_iter()
            .filter(|row| row.weather_date_id == weather_date_id)
            .collect()
    }

    pub fn update_count(&self) -> usize {
        self.state.lock().unwrap().updates
    }
}

#[async_trait]
impl WeatherStore for MemoryStore {
    async fn find_missing_dates(&self, as_of: NaiveDateTime) -> Result<Vec<WeatherDate>, DbError> {
        let state = self.state.lock().unwrap();
        let mut dates: Vec<WeatherDate> = state
            .dates
            .iter()
            .filter(|date| date.date <= as_of)
            .filter(|date| !state.rows.iter().any(|row| row.weather_date_id == date.id))
            .cloned()
            .collect();
        dates.sort_by_key(|date| (date.date, date.id));
        Ok(dates)
    }

    async fn insert(
        &self,
        weather_date_id: i32,
        wind_speed: Option<f64>,
        irradiance: Option<f64>,
    ) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        let id = state.rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        state.rows.push(StoredRow {
            id,
            weather_date_id,
            wind_speed,
            irradiance,
        });
        Ok(())
    }

    async fn find_null_column(&self, column: WeatherColumn) -> Result<Vec<NullColumnRow>, DbError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<NullColumnRow> = state
            .rows
            .iter()
            .filter(|row| match column {
                WeatherColumn::WindSpeed => row.wind_speed.is_none(),
                WeatherColumn::Irradiance => row.irradiance.is_none(),
            })
            .filter_map(|row| {
                state
                    .dates
                    .iter()
                    .find(|date| date.id == row.weather_date_id)
                    .map(|date| NullColumnRow {
                        id: row.id,
                        date: date.date,
                    })
            })
            .collect();
        rows.sort_by_key(|row| (row.date, row.id));
        Ok(rows)
    }

    async fn update_column(
        &self,
        row_id: i32,
        column: WeatherColumn,
        value: f64,
    ) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.updates += 1;
        if let Some(row) = state.rows.iter_mut().find(|row| row.id == row_id) {
            match column {
                WeatherColumn::WindSpeed => row.wind_speed = Some(value),
                WeatherColumn::Irradiance => row.irradiance = Some(value),
            }
        }
        Ok(())
    }
}

/// Sampler returning scripted medians per timestamp and recording lookups
#[derive(Default)]
pub struct ScriptedSampler {
    medians: HashMap<NaiveDateTime, f64>,
    calls: Mutex<Vec<NaiveDateTime>>,
}

impl ScriptedSampler {
    pub fn new(medians: &[(&str, f64)]) -> Self {
        Self {
            medians: medians.iter().map(|(at, v)| (dt(at), *v)).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<NaiveDateTime> {
        self.calls.lock().unwrap().clone()
    }
}

impl SamplerSource for ScriptedSampler {
    fn last_hour_median(&self, at: NaiveDateTime) -> Result<Option<f64>, SamplerError> {
        self.calls.lock().unwrap().push(at);
        Ok(self.medians.get(&at).copied())
    }
}

/// Sampler whose every lookup fails
pub struct BrokenSampler;

impl SamplerSource for BrokenSampler {
    fn last_hour_median(&self, _at: NaiveDateTime) -> Result<Option<f64>, SamplerError> {
        Err(SamplerError::Parse {
            line: 0,
            message: "sampler archive unavailable".to_string(),
        })
    }
}

/// Store that reads from an inner `MemoryStore` but fails every write,
/// or every statement when built with `failing_queries`
pub struct FailingStore {
    inner: MemoryStore,
    fail_queries: bool,
}

impl FailingStore {
    pub fn failing_writes(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_queries: false,
        }
    }

    pub fn failing_queries(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_queries: true,
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn connection_lost() -> DbError {
        DbError::SqlxError(sqlx::Error::PoolClosed)
    }
}

#[async_trait]
impl WeatherStore for FailingStore {
    async fn find_missing_dates(&self, as_of: NaiveDateTime) -> Result<Vec<WeatherDate>, DbError> {
        if self.fail_queries {
            return Err(Self::connection_lost());
        }
        self.inner.find_missing_dates(as_of).await
    }

    async fn insert(
        &self,
        _weather_date_id: i32,
        _wind_speed: Option<f64>,
        _irradiance: Option<f64>,
    ) -> Result<(), DbError> {
        Err(Self::connection_lost())
    }

    async fn find_null_column(&self, column: WeatherColumn) -> Result<Vec<NullColumnRow>, DbError> {
        if self.fail_queries {
            return Err(Self::connection_lost());
        }
        self.inner.find_null_column(column).await
    }

    async fn update_column(
        &self,
        _row_id: i32,
        _column: WeatherColumn,
        _value: f64,
    ) -> Result<(), DbError> {
        Err(Self::connection_lost())
    }
}
