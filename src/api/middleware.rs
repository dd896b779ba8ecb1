//! API Middleware
//!
//! Request context, the authentication gate, request logging and the
//! opt-in request-level audit trail.

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Query, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::audit::{derive_action, derive_table, describe_request, extract_record_id, AuditRecord};
use crate::auth::AuthUser;
use crate::domain::{DomainError, OperationContext};
use crate::error::{AppError, AppResult};

use super::requests::{self, JsonObject};
use super::state::AppState;

/// Largest body buffered by the gate or the request audit
const MAX_BUFFERED_BODY: usize = 1024 * 1024;

const INVALID_TOKEN: &str = "Token invalido o expirado";
const MISSING_CREDENTIALS: &str = "Token requerido o credenciales de administrador";
const INVALID_CREDENTIALS: &str = "Credenciales inválidas";
const ADMIN_ONLY: &str = "Acceso solo para administradores";

// =========================================================================
// Request context
// =========================================================================

/// Attach an [`OperationContext`] keyed on the request id
pub async fn context_middleware(mut request: Request<Body>, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    request
        .extensions_mut()
        .insert(OperationContext::new().with_correlation_id(correlation_id));

    next.run(request).await
}

// =========================================================================
// Authentication gate
// =========================================================================

/// Bearer token from the `Authorization` header, if one is actually present
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();

    (!token.is_empty()).then(|| token.to_string())
}

/// Email and password from the JSON body, else from the query string.
/// The body is handed back so the handler can still read it. A body too
/// large to buffer carries no usable credentials.
async fn take_credentials(
    request: Request<Body>,
) -> AppResult<(Request<Body>, Option<(String, String)>)> {
    let (parts, body) = request.into_parts();
    let bytes: Bytes = to_bytes(body, MAX_BUFFERED_BODY)
        .await
        .map_err(|_| AppError::Unauthorized(MISSING_CREDENTIALS.to_string()))?;

    let from_body = serde_json::from_slice::<JsonObject>(&bytes)
        .ok()
        .and_then(|body| requests::credentials(&body));

    let credentials = from_body.or_else(|| {
        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri).ok()?;
        let query: JsonObject = params
            .into_iter()
            .map(|(key, value)| (key, serde_json::Value::String(value)))
            .collect();
        requests::credentials(&query)
    });

    Ok((Request::from_parts(parts, Body::from(bytes)), credentials))
}

async fn admit_administrator(state: &AppState, email: &str, password: &str) -> AppResult<AuthUser> {
    let user = match state.users.authenticate(email, password).await {
        Ok(user) => user,
        Err(DomainError::InvalidCredentials) => {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    if !user.is_admin() {
        tracing::info!(user_id = user.id, "Credential fallback refused for non-administrator");
        return Err(AppError::Unauthorized(ADMIN_ONLY.to_string()));
    }

    Ok(AuthUser {
        id: user.id,
        email: user.email,
    })
}

/// Admit a request with a valid bearer token, or with administrator
/// credentials in the body or query when no token is sent.
pub async fn auth_gate(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> AppResult<Response> {
    let (mut request, caller) = match bearer_token(request.headers()) {
        Some(token) => {
            let claims = state
                .tokens
                .verify(&token)
                .map_err(|_| AppError::Forbidden(INVALID_TOKEN.to_string()))?;
            let caller = AuthUser {
                id: claims.id,
                email: claims.email,
            };
            (request, caller)
        }
        None => {
            let (request, credentials) = take_credentials(request).await?;
            let (email, password) = credentials
                .ok_or_else(|| AppError::Unauthorized(MISSING_CREDENTIALS.to_string()))?;
            let caller = admit_administrator(&state, &email, &password).await?;
            (request, caller)
        }
    };

    match request.extensions_mut().get_mut::<OperationContext>() {
        Some(context) => context.actor_id = Some(caller.id),
        None => {
            let context = OperationContext::new().with_actor(caller.id);
            request.extensions_mut().insert(context);
        }
    }
    request.extensions_mut().insert(caller.clone());

    let mut response = next.run(request).await;
    // Outer middleware only sees the response
    response.extensions_mut().insert(caller);
    Ok(response)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request logging
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    let headers = mask_headers_for_logging(request.headers());

    let correlation_id = request
        .extensions()
        .get::<OperationContext>()
        .and_then(|ctx| ctx.correlation_id);

    let start = Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        correlation_id = ?correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}

// =========================================================================
// Request-level audit
// =========================================================================

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// One audit entry per exchange, written on a spawned task after the
/// response is built. The JSON response body is inspected for a record id.
pub async fn request_audit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let mut context = request
        .extensions()
        .get::<OperationContext>()
        .cloned()
        .unwrap_or_default();

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    if let Some(caller) = response.extensions().get::<AuthUser>() {
        context.actor_id = Some(caller.id);
    }
    let status = response.status();

    let (response, body) = if is_json(response.headers()) {
        let (parts, body) = response.into_parts();
        match to_bytes(body, MAX_BUFFERED_BODY).await {
            Ok(bytes) => {
                let value = serde_json::from_slice::<serde_json::Value>(&bytes).ok();
                (Response::from_parts(parts, Body::from(bytes)), value)
            }
            Err(e) => {
                tracing::warn!(error = %e, uri = %uri, "Response body could not be buffered for audit");
                (Response::from_parts(parts, Body::empty()), None)
            }
        }
    } else {
        (response, None)
    };

    let path = uri.path();
    let record = AuditRecord::new(derive_action(&method, path))
        .table(&derive_table(path))
        .maybe_record_id(extract_record_id(path, body.as_ref()))
        .description(describe_request(&method, &uri.to_string(), status.as_u16(), elapsed));

    let recorder = state.recorder.clone();
    tokio::spawn(async move {
        recorder.record(record, &context).await;
    });

    response
}
