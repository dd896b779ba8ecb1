//! Audit trail entries (`auditoria`)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::status;

/// Kind of action recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Auth,
    Read,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Auth => "AUTH",
            AuditAction::Read => "READ",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREATE" => Ok(AuditAction::Create),
            "UPDATE" => Ok(AuditAction::Update),
            "DELETE" => Ok(AuditAction::Delete),
            "AUTH" => Ok(AuditAction::Auth),
            "READ" => Ok(AuditAction::Read),
            other => Err(format!("unknown audit action: {other}")),
        }
    }
}

impl Serialize for AuditAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub id: i32,
    #[serde(rename = "usuarioId")]
    pub actor_id: Option<i32>,
    #[serde(rename = "tablaAfectada")]
    pub table: String,
    #[serde(rename = "registroId")]
    pub record_id: Option<i32>,
    #[serde(rename = "accion")]
    pub action: AuditAction,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "estado")]
    pub status: i32,
    #[serde(rename = "fecha")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub actor_id: Option<i32>,
    pub table: String,
    pub record_id: Option<i32>,
    pub action: AuditAction,
    pub description: String,
    pub status: i32,
    pub recorded_at: DateTime<Utc>,
}

impl NewAuditEntry {
    pub fn new(action: AuditAction, table: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            actor_id: None,
            table: table.into(),
            record_id: None,
            action,
            description: description.into(),
            status: status::ACTIVE,
            recorded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditEntryChanges {
    pub actor_id: Option<i32>,
    pub table: Option<String>,
    pub record_id: Option<i32>,
    pub action: Option<AuditAction>,
    pub description: Option<String>,
    pub status: Option<i32>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl AuditEntryChanges {
    pub fn deactivate() -> Self {
        Self {
            status: Some(status::INACTIVE),
            ..Self::default()
        }
    }

    pub fn apply_to(self, entry: &mut AuditEntry) {
        if let Some(actor_id) = self.actor_id {
            entry.actor_id = Some(actor_id);
        }
        if let Some(table) = self.table {
            entry.table = table;
        }
        if let Some(record_id) = self.record_id {
            entry.record_id = Some(record_id);
        }
        if let Some(action) = self.action {
            entry.action = action;
        }
        if let Some(description) = self.description {
            entry.description = description;
        }
        if let Some(status) = self.status {
            entry.status = status;
        }
        if let Some(recorded_at) = self.recorded_at {
            entry.recorded_at = recorded_at;
        }
    }
}
