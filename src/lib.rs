pub mod config;
pub mod geo;
pub mod models;
pub mod notifier;
pub mod query;
pub mod reconciler;
pub mod routes;
pub mod scheduler;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod utils;
