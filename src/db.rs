pub mod error;
pub mod models;
pub mod weather_repository;
pub mod weather_store;

pub use error::DbError;
pub use models::*;
pub use weather_repository::WeatherRepository;
pub use weather_store::WeatherStore;
