//! HTTP front end for the salary predictor

pub mod api;
pub mod config;

pub use api::{create_router, serve, AppState};
pub use config::ServerConfig;
