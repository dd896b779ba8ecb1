//! Abuse reports (`reporte`) raised by a user against a publication

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::status;
use super::{PublicationSummary, UserSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: i32,
    #[serde(rename = "reportanteId")]
    pub reporter_id: i32,
    #[serde(rename = "publicacionId")]
    pub publication_id: i32,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "estado")]
    pub status: i32,
    #[serde(rename = "fechaReporte")]
    pub reported_at: DateTime<Utc>,
    #[serde(rename = "reportante", skip_serializing_if = "Option::is_none")]
    pub reporter: Option<UserSummary>,
    #[serde(rename = "publicacion", skip_serializing_if = "Option::is_none")]
    pub publication: Option<PublicationSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub reporter_id: i32,
    pub publication_id: i32,
    pub description: String,
    pub status: i32,
    pub reported_at: DateTime<Utc>,
}

impl NewReport {
    pub fn new(reporter_id: i32, publication_id: i32, description: impl Into<String>) -> Self {
        Self {
            reporter_id,
            publication_id,
            description: description.into(),
            status: status::ACTIVE,
            reported_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportChanges {
    pub reporter_id: Option<i32>,
    pub publication_id: Option<i32>,
    pub description: Option<String>,
    pub status: Option<i32>,
    pub reported_at: Option<DateTime<Utc>>,
}

impl ReportChanges {
    pub fn deactivate() -> Self {
        Self {
            status: Some(status::INACTIVE),
            ..Self::default()
        }
    }

    pub fn apply_to(self, report: &mut Report) {
        if let Some(reporter_id) = self.reporter_id {
            report.reporter_id = reporter_id;
        }
        if let Some(publication_id) = self.publication_id {
            report.publication_id = publication_id;
        }
        if let Some(description) = self.description {
            report.description = description;
        }
        if let Some(status) = self.status {
            report.status = status;
        }
        if let Some(reported_at) = self.reported_at {
            report.reported_at = reported_at;
        }
    }
}
