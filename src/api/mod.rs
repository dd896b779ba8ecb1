//! API module
//!
//! HTTP surface: routes, middleware, request normalization and validation.

pub mod middleware;
pub mod requests;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::{AppState, AppStateInner};
