//! Audit Recorder
//!
//! Best-effort writes to the `auditoria` table. Recording never fails the
//! caller: storage errors are logged and dropped. Also holds the rules used
//! to derive an entry from a bare HTTP exchange.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use chrono::Utc;

use crate::domain::{status, AuditAction, NewAuditEntry, OperationContext};
use crate::repository::AuditRepository;

/// Mount prefix of the HTTP surface
pub const API_PREFIX: &str = "foodloop";

/// Values written to `tabla_afectada`
pub mod tables {
    pub const USERS: &str = "usuarios";
    pub const CATEGORIES: &str = "categorias";
    pub const PUBLICATIONS: &str = "publicaciones";
    pub const TRANSACTIONS: &str = "transacciones";
    pub const REPORTS: &str = "reportes";
    pub const AUDITS: &str = "auditorias";
}

/// Response keys searched, in order, for the affected record id
const RECORD_ID_KEYS: [&str; 6] = [
    "id",
    "userId",
    "reporteId",
    "categoriaId",
    "publicacionId",
    "transaccionId",
];

// =========================================================================
// Builder
// =========================================================================

/// Builder for one audit entry
#[derive(Debug, Clone)]
pub struct AuditRecord {
    action: AuditAction,
    table: String,
    record_id: Option<i32>,
    description: String,
}

impl AuditRecord {
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            table: String::new(),
            record_id: None,
            description: String::new(),
        }
    }

    /// Set the affected table
    pub fn table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    /// Set the affected record
    pub fn record_id(mut self, record_id: i32) -> Self {
        self.record_id = Some(record_id);
        self
    }

    pub fn maybe_record_id(mut self, record_id: Option<i32>) -> Self {
        self.record_id = record_id;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Entry stamped now, attributed to the context's actor
    pub fn into_entry(self, context: &OperationContext) -> NewAuditEntry {
        NewAuditEntry {
            actor_id: context.actor_id,
            table: self.table,
            record_id: self.record_id,
            action: self.action,
            description: self.description,
            status: status::ACTIVE,
            recorded_at: Utc::now(),
        }
    }
}

// =========================================================================
// Recorder
// =========================================================================

/// Handle shared through the application state
#[derive(Clone)]
pub struct AuditRecorder {
    repository: Arc<dyn AuditRepository>,
}

impl AuditRecorder {
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Write one entry. Never fails: errors are logged at `warn`.
    pub async fn record(&self, record: AuditRecord, context: &OperationContext) {
        let entry = record.into_entry(context);
        let action = entry.action;
        let table = entry.table.clone();

        match self.repository.create(entry).await {
            Ok(id) => {
                tracing::debug!(
                    audit_id = id,
                    action = %action,
                    table = %table,
                    correlation_id = ?context.correlation_id,
                    "Audit entry recorded"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    action = %action,
                    table = %table,
                    correlation_id = ?context.correlation_id,
                    "Failed to record audit entry"
                );
            }
        }
    }
}

// =========================================================================
// Request derivation
// =========================================================================

fn path_segments(uri_path: &str) -> Vec<&str> {
    let path = uri_path.split('?').next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Table affected by a request, from its path
pub fn derive_table(uri_path: &str) -> String {
    let segments = path_segments(uri_path);
    let Some(first) = segments.first() else {
        return "root".to_string();
    };

    if !first.eq_ignore_ascii_case(API_PREFIX) {
        return first.to_lowercase();
    }

    let segment = segments
        .get(1)
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "root".to_string());

    match segment.as_str() {
        "users" | "login" | "register" => tables::USERS.to_string(),
        _ => segment,
    }
}

/// Action implied by the method and path
pub fn derive_action(method: &Method, uri_path: &str) -> AuditAction {
    match *method {
        Method::POST if uri_path.contains("/login") => AuditAction::Auth,
        Method::POST => AuditAction::Create,
        Method::PUT if uri_path.contains("/delete") => AuditAction::Delete,
        Method::PUT | Method::PATCH => AuditAction::Update,
        Method::DELETE => AuditAction::Delete,
        _ => AuditAction::Read,
    }
}

/// Numeric trailing path segment, else the first positive id in the body
pub fn extract_record_id(uri_path: &str, response: Option<&serde_json::Value>) -> Option<i32> {
    if let Some(id) = path_segments(uri_path)
        .last()
        .and_then(|s| s.parse::<i32>().ok())
    {
        return Some(id);
    }

    let body = response?.as_object()?;
    RECORD_ID_KEYS.iter().find_map(|key| {
        let value = body.get(*key)?;
        let id = match value {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }?;
        i32::try_from(id).ok().filter(|id| *id > 0)
    })
}

/// `Solicitud <METHOD> <uri> -> estado <status> (<ms> ms)`
pub fn describe_request(method: &Method, uri: &str, status: u16, elapsed: Duration) -> String {
    format!(
        "Solicitud {} {} -> estado {} ({} ms)",
        method,
        uri,
        status,
        elapsed.as_millis()
    )
}
