// Infrastructure layer - external dependencies and adapters
pub mod auth_provider;
pub mod config;
pub mod data_api;
pub mod memory;
pub mod uploads;
