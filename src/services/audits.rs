//! Direct access to the audit trail for administrators and tooling

use std::sync::Arc;

use crate::domain::{AuditEntry, AuditEntryChanges, DomainError, DomainResult, NewAuditEntry};
use crate::repository::AuditRepository;

const AUDIT_NOT_FOUND: &str = "No encontrada";

#[derive(Clone)]
pub struct AuditService {
    audits: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(audits: Arc<dyn AuditRepository>) -> Self {
        Self { audits }
    }

    pub async fn create(&self, entry: NewAuditEntry) -> DomainResult<i32> {
        Ok(self.audits.create(entry).await?)
    }

    pub async fn update(&self, id: i32, changes: AuditEntryChanges) -> DomainResult<bool> {
        if self.audits.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(AUDIT_NOT_FOUND));
        }
        if !self.audits.update(id, changes).await? {
            return Err(DomainError::not_found(AUDIT_NOT_FOUND));
        }
        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<bool> {
        self.update(id, AuditEntryChanges::deactivate()).await
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<Option<AuditEntry>> {
        Ok(self.audits.find_by_id(id).await?)
    }

    pub async fn get_all(&self) -> DomainResult<Vec<AuditEntry>> {
        Ok(self.audits.find_all().await?)
    }
}
