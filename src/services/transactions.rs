use std::sync::Arc;

use crate::domain::{
    DomainError, DomainResult, NewTransaction, Transaction, TransactionChanges,
};
use crate::repository::{PublicationRepository, TransactionRepository};

const TRANSACTION_NOT_FOUND: &str = "Transacción no encontrada";

#[derive(Clone)]
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
    publications: Arc<dyn PublicationRepository>,
}

impl TransactionService {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        publications: Arc<dyn PublicationRepository>,
    ) -> Self {
        Self {
            transactions,
            publications,
        }
    }

    /// Store a transaction against an existing, active publication
    pub async fn create(&self, transaction: NewTransaction) -> DomainResult<i32> {
        let publication = self
            .publications
            .find_by_id(transaction.publication_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "Publicación {} no encontrada",
                    transaction.publication_id
                ))
            })?;

        if !publication.is_available() {
            return Err(DomainError::PublicationUnavailable(publication.id));
        }

        let id = self.transactions.create(transaction).await?;
        tracing::info!(
            transaction_id = id,
            publication_id = publication.id,
            "Transaction created"
        );
        Ok(id)
    }

    pub async fn update(&self, id: i32, changes: TransactionChanges) -> DomainResult<bool> {
        if self.transactions.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(TRANSACTION_NOT_FOUND));
        }
        if !self.transactions.update(id, changes).await? {
            return Err(DomainError::not_found(TRANSACTION_NOT_FOUND));
        }
        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<bool> {
        self.update(id, TransactionChanges::deactivate()).await
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<Option<Transaction>> {
        Ok(self.transactions.find_by_id(id).await?)
    }

    pub async fn get_all(&self) -> DomainResult<Vec<Transaction>> {
        Ok(self.transactions.find_all().await?)
    }
}
