use std::sync::Arc;

use crate::domain::{DomainError, DomainResult, NewReport, Report, ReportChanges};
use crate::repository::ReportRepository;

const REPORT_NOT_FOUND: &str = "Reporte no encontrado";

#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    pub async fn create(&self, report: NewReport) -> DomainResult<i32> {
        let id = self.reports.create(report).await?;
        tracing::info!(report_id = id, "Report created");
        Ok(id)
    }

    pub async fn update(&self, id: i32, changes: ReportChanges) -> DomainResult<bool> {
        if self.reports.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(REPORT_NOT_FOUND));
        }
        if !self.reports.update(id, changes).await? {
            return Err(DomainError::not_found(REPORT_NOT_FOUND));
        }
        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<bool> {
        self.update(id, ReportChanges::deactivate()).await
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<Option<Report>> {
        Ok(self.reports.find_by_id(id).await?)
    }

    pub async fn get_all(&self) -> DomainResult<Vec<Report>> {
        Ok(self.reports.find_all().await?)
    }
}
