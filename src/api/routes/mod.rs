//! API Routes
//!
//! Route table for the `/foodloop` surface. Handlers live in one module per
//! table. The authentication gate is a route layer on each method router, so
//! a public read and a gated write can share a path and unsupported methods
//! still answer 405.

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::audit::API_PREFIX;

use super::middleware::{
    auth_gate, context_middleware, logging_middleware, request_audit_middleware,
};
use super::state::AppState;

mod audits;
mod categories;
mod publications;
mod reports;
mod transactions;
mod users;

// =========================================================================
// Response types
// =========================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// `{message, id}` returned by most create routes
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i32,
}

impl CreatedResponse {
    pub fn new(message: impl Into<String>, id: i32) -> Json<Self> {
        Json(Self {
            message: message.into(),
            id,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// =========================================================================
// API Router
// =========================================================================

/// Every `/foodloop` route, without outer layers
fn api_routes(state: &AppState) -> Router<AppState> {
    let gate = middleware::from_fn_with_state(state.clone(), auth_gate);

    Router::new()
        .route("/health", get(health_check))
        // Accounts
        .route("/login", post(users::login))
        .route("/register", post(users::register))
        .route(
            "/users",
            post(users::register)
                .get(users::list_users)
                .route_layer(gate.clone()),
        )
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .route_layer(gate.clone()),
        )
        .route("/users/email/:email", get(users::get_user_by_email).route_layer(gate.clone()))
        .route("/users/query/id", get(users::query_user_by_id).route_layer(gate.clone()))
        .route("/users/query/email", get(users::query_user_by_email).route_layer(gate.clone()))
        .route("/users/delete/:id", put(users::delete_user).route_layer(gate.clone()))
        .route("/users/query/delete", put(users::query_delete_user).route_layer(gate.clone()))
        .route("/users/password/reset", put(users::reset_password).route_layer(gate.clone()))
        // Categories
        .route("/categorias", get(categories::list_categories))
        .route(
            "/categorias",
            post(categories::create_category).route_layer(gate.clone()),
        )
        .route("/categorias/:id", get(categories::get_category))
        .route(
            "/categorias/:id",
            put(categories::update_category).route_layer(gate.clone()),
        )
        .route(
            "/categorias/delete/:id",
            put(categories::delete_category).route_layer(gate.clone()),
        )
        // Publications
        .route("/publicaciones", get(publications::list_publications))
        .route(
            "/publicaciones",
            post(publications::create_publication).route_layer(gate.clone()),
        )
        .route("/publicaciones/:id", get(publications::get_publication))
        .route(
            "/publicaciones/:id",
            put(publications::update_publication).route_layer(gate.clone()),
        )
        .route(
            "/publicaciones/delete/:id",
            put(publications::delete_publication).route_layer(gate.clone()),
        )
        // Transactions
        .route(
            "/transacciones",
            post(transactions::create_transaction)
                .get(transactions::list_transactions)
                .route_layer(gate.clone()),
        )
        .route(
            "/transacciones/:id",
            get(transactions::get_transaction)
                .put(transactions::update_transaction)
                .route_layer(gate.clone()),
        )
        .route(
            "/transacciones/delete/:id",
            put(transactions::delete_transaction).route_layer(gate.clone()),
        )
        // Reports
        .route(
            "/reportes",
            post(reports::create_report)
                .get(reports::list_reports)
                .route_layer(gate.clone()),
        )
        .route(
            "/reportes/:id",
            get(reports::get_report)
                .put(reports::update_report)
                .route_layer(gate.clone()),
        )
        .route("/reportes/query/id", get(reports::query_report_by_id).route_layer(gate.clone()))
        .route("/reportes/delete/:id", put(reports::delete_report).route_layer(gate.clone()))
        .route(
            "/reportes/query/delete",
            put(reports::query_delete_report).route_layer(gate.clone()),
        )
        // Audit trail
        .route(
            "/auditorias",
            post(audits::create_audit)
                .get(audits::list_audits)
                .route_layer(gate.clone()),
        )
        .route(
            "/auditorias/:id",
            get(audits::get_audit)
                .put(audits::update_audit)
                .route_layer(gate.clone()),
        )
        .route("/auditorias/delete/:id", put(audits::delete_audit).route_layer(gate))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the application router
///
/// Layers run outermost first: request id, CORS, tracing, context,
/// logging, then the optional request audit.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new().nest(&format!("/{API_PREFIX}"), api_routes(&state));

    if state.audit_requests {
        router = router.layer(middleware::from_fn_with_state(
            state.clone(),
            request_audit_middleware,
        ));
    }

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
