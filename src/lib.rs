//! FoodLoop Library
//!
//! Re-exports modules for integration testing and the tooling binaries.

pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod repository;
pub mod services;

pub use api::{create_router, AppState, AppStateInner};
pub use config::Config;
pub use domain::{DomainError, OperationContext};
pub use error::{AppError, AppResult};
