use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tracing::info;

use weather_importer::config::Config;
use weather_importer::db::{WeatherRepository, WEATHER_DATE_FORMAT};
use weather_importer::sampler::SamplerLog;
use weather_importer::services::WeatherImportService;

#[derive(Parser)]
#[command(name = "weather-import")]
#[command(about = "Populate and backfill the GBT weather table from sampler logs", long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(long, env)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List weather dates that have no weather row yet
    Missing {
        /// Only dates at or before this time, "YYYY-MM-DD HH:MM:SS" (default: now, UTC)
        #[arg(long, value_parser = parse_weather_date)]
        as_of: Option<NaiveDateTime>,
    },

    /// Insert weather rows for every weather date that lacks one
    Populate,

    /// Fill NULL measurements in existing weather rows
    Backfill {
        #[arg(value_enum)]
        target: BackfillTarget,
    },

    /// Backfill irradiance and write a report of the filled rows
    Report {
        /// Report file (overwritten if it exists)
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackfillTarget {
    Wind,
    Irradiance,
    All,
}

fn parse_weather_date(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, WEATHER_DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD HH:MM:SS: {e}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // One connection for the whole run; every statement auto-commits
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&cli.database_url)
        .await?;
    let repo = WeatherRepository::new(pool);

    match cli.command {
        Command::Missing { as_of } => {
            let service = WeatherImportService::for_store(repo);
            let dates = service.find_missing_dates(as_of).await?;
            for date in &dates {
                println!("{},{}", date.id, date.date.format(WEATHER_DATE_FORMAT));
            }
            println!("{} weather dates need data", dates.len());
        }
        Command::Populate => {
            let service = build_service(repo)?;
            let rows = service.populate().await?;
            for row in &rows {
                println!(
                    "{},{},{}",
                    row.weather_date_id, row.wind_speed, row.irradiance
                );
            }
            println!("✓ Inserted {} weather rows", rows.len());
        }
        Command::Backfill { target } => {
            let service = build_service(repo)?;
            if matches!(target, BackfillTarget::Wind | BackfillTarget::All) {
                let filled = service.backfill_wind().await?;
                println!("✓ Backfilled {} wind speed values", filled.len());
            }
            if matches!(target, BackfillTarget::Irradiance | BackfillTarget::All) {
                let filled = service.backfill_irradiance().await?;
                println!("✓ Backfilled {} irradiance values", filled.len());
            }
        }
        Command::Report { path } => {
            let service = build_service(repo)?;
            let report = service.backfill_report(&path).await?;
            println!(
                "printed report to: {} ({} rows backfilled)",
                path.display(),
                report.entries.len()
            );
        }
    }

    Ok(())
}

/// Load sampler logs named by the environment and wire up the importer
fn build_service(
    repo: WeatherRepository,
) -> Result<WeatherImportService<WeatherRepository, SamplerLog, SamplerLog>, Box<dyn std::error::Error>>
{
    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let wind = SamplerLog::from_path(&config.wind_sampler_log, config.sampler_window())?;
    let irradiance =
        SamplerLog::from_path(&config.irradiance_sampler_log, config.sampler_window())?;

    Ok(WeatherImportService::new(repo, wind, irradiance)
        .with_accept_zero(config.backfill_accept_zero))
}
