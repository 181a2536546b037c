//! Librarium Library Management Admin Server
//!
//! A Rust REST API server for the administrative side of a library:
//! catalog management, borrow-request approval, loan tracking, reporting
//! and spreadsheet export.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
