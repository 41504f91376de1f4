use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use crate::db::{DbError, NullColumnRow, WeatherColumn, WeatherDate, WeatherStore};

/// Postgres access to `weather_dates` and `gbt_weather`
#[derive(Clone)]
pub struct WeatherRepository {
    pool: PgPool,
}

impl WeatherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Column identifiers cannot be bound, so each column gets its own statement
    fn null_column_query(column: WeatherColumn) -> &'static str {
        match column {
            WeatherColumn::WindSpeed => {
                r#"
                SELECT gbt.id, wd.date
                FROM gbt_weather AS gbt
                JOIN weather_dates AS wd ON gbt.weather_date_id = wd.id
                WHERE gbt.wind_speed IS NULL
                ORDER BY wd.date, gbt.id
                "#
            }
            WeatherColumn::Irradiance => {
                r#"
                SELECT gbt.id, wd.date
                FROM gbt_weather AS gbt
                JOIN weather_dates AS wd ON gbt.weather_date_id = wd.id
                WHERE gbt.irradiance IS NULL
                ORDER BY wd.date, gbt.id
                "#
            }
        }
    }

    fn update_column_query(column: WeatherColumn) -> &'static str {
        match column {
            WeatherColumn::WindSpeed => "UPDATE gbt_weather SET wind_speed = $1 WHERE id = $2",
            WeatherColumn::Irradiance => "UPDATE gbt_weather SET irradiance = $1 WHERE id = $2",
        }
    }
}

#[async_trait]
impl WeatherStore for WeatherRepository {
    #[instrument(skip(self))]
    async fn find_missing_dates(&self, as_of: NaiveDateTime) -> Result<Vec<WeatherDate>, DbError> {
        debug!("Querying weather dates without weather rows up to {}", as_of);

        let dates = sqlx::query_as::<_, WeatherDate>(
            r#"
            SELECT wd.id, wd.date
            FROM weather_dates AS wd
            WHERE NOT EXISTS (
                SELECT 1 FROM gbt_weather AS gbt WHERE gbt.weather_date_id = wd.id
            )
              AND wd.date <= $1
            ORDER BY wd.date, wd.id
            "#,
        )
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} weather dates needing data", dates.len());
        Ok(dates)
    }

    #[instrument(skip(self))]
    async fn insert(
        &self,
        weather_date_id: i32,
        wind_speed: Option<f64>,
        irradiance: Option<f64>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO gbt_weather (weather_date_id, wind_speed, irradiance)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(weather_date_id)
        .bind(wind_speed)
        .bind(irradiance)
        .execute(&self.pool)
        .await?;

        debug!("Inserted weather row for weather date {}", weather_date_id);
        Ok(())
    }

    #[instrument(skip(self), fields(column = %column))]
    async fn find_null_column(&self, column: WeatherColumn) -> Result<Vec<NullColumnRow>, DbError> {
        let rows = sqlx::query_as::<_, NullColumnRow>(Self::null_column_query(column))
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} weather rows missing {}", rows.len(), column);
        Ok(rows)
    }

    #[instrument(skip(self), fields(column = %column))]
    async fn update_column(
        &self,
        row_id: i32,
        column: WeatherColumn,
        value: f64,
    ) -> Result<(), DbError> {
        let result = sqlx::query(Self::update_column_query(column))
            .bind(value)
            .bind(row_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!("No weather row with id {} to update", row_id);
        }
        Ok(())
    }
}
