use std::sync::Arc;

use crate::audit::{tables, AuditRecord, AuditRecorder};
use crate::domain::{
    AuditAction, DomainError, DomainResult, NewPublication, OperationContext, Publication,
    PublicationChanges,
};
use crate::repository::PublicationRepository;

const PUBLICATION_NOT_FOUND: &str = "No encontrada";

#[derive(Clone)]
pub struct PublicationService {
    publications: Arc<dyn PublicationRepository>,
    recorder: AuditRecorder,
}

impl PublicationService {
    pub fn new(publications: Arc<dyn PublicationRepository>, recorder: AuditRecorder) -> Self {
        Self {
            publications,
            recorder,
        }
    }

    pub async fn create(&self, publication: NewPublication) -> DomainResult<i32> {
        let id = self.publications.create(publication).await?;
        tracing::info!(publication_id = id, "Publication created");
        Ok(id)
    }

    pub async fn update(&self, id: i32, changes: PublicationChanges) -> DomainResult<bool> {
        if self.publications.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(PUBLICATION_NOT_FOUND));
        }
        if !self.publications.update(id, changes).await? {
            return Err(DomainError::not_found(PUBLICATION_NOT_FOUND));
        }
        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<bool> {
        self.update(id, PublicationChanges::pause()).await
    }

    /// Set `estado = 0` so the publication leaves the active listing
    pub async fn pause(&self, id: i32) -> DomainResult<bool> {
        self.update(id, PublicationChanges::pause()).await
    }

    /// Pause a publication once a transaction on it has been stored.
    ///
    /// Never fails: the transaction is already committed, so a failed pause is
    /// logged and left for an operator. On success an UPDATE entry is audited.
    pub async fn pause_after_transaction(
        &self,
        publication_id: i32,
        transaction_id: i32,
        context: &OperationContext,
    ) {
        match self.pause(publication_id).await {
            Ok(_) => {
                self.recorder
                    .record(
                        AuditRecord::new(AuditAction::Update)
                            .table(tables::PUBLICATIONS)
                            .record_id(publication_id)
                            .description(format!(
                                "Publicación {publication_id} pausada por la transacción {transaction_id}"
                            )),
                        context,
                    )
                    .await;
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    publication_id,
                    transaction_id,
                    "Failed to pause publication after transaction"
                );
            }
        }
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<Option<Publication>> {
        Ok(self.publications.find_by_id(id).await?)
    }

    pub async fn get_all(&self) -> DomainResult<Vec<Publication>> {
        Ok(self.publications.find_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status;
    use crate::repository::{AuditRepository, MemoryStore};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample() -> NewPublication {
        NewPublication {
            owner_id: 1,
            category_id: 1,
            title: "Pan".to_string(),
            description: "Pan del día".to_string(),
            kind: "Donacion".to_string(),
            quantity: "20 unidades".to_string(),
            price: dec!(0),
            expires_on: NaiveDate::from_ymd_opt(2025, 11, 30).unwrap(),
            status: status::ACTIVE,
        }
    }

    fn service(store: &Arc<MemoryStore>) -> PublicationService {
        PublicationService::new(store.clone(), AuditRecorder::new(store.clone()))
    }

    #[tokio::test]
    async fn test_pause_after_transaction_pauses_and_audits() {
        let store = Arc::new(MemoryStore::new());
        let service = service(&store);
        let id = service.create(sample()).await.unwrap();

        service
            .pause_after_transaction(id, 5, &OperationContext::new().with_actor(2))
            .await;

        let publication = service.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(publication.status, status::INACTIVE);

        let entries = AuditRepository::find_all(store.as_ref()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Update);
        assert_eq!(entries[0].record_id, Some(id));
        assert_eq!(entries[0].actor_id, Some(2));
    }

    #[tokio::test]
    async fn test_pause_after_transaction_on_missing_publication_is_silent() {
        let store = Arc::new(MemoryStore::new());
        let service = service(&store);

        service
            .pause_after_transaction(77, 1, &OperationContext::new())
            .await;

        assert!(AuditRepository::find_all(store.as_ref()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_publication() {
        let store = Arc::new(MemoryStore::new());
        let service = service(&store);
        assert!(matches!(
            service.update(1, PublicationChanges::default()).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
