pub mod weather_import_service;

pub use weather_import_service::{usable_measurement, ImportError, WeatherImportService};
