pub mod config;
pub mod db;
pub mod report;
pub mod sampler;
pub mod services;
