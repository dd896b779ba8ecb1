//! Storage ports and adapters
//!
//! One trait per table. Services depend on the traits only; `postgres`
//! implements them over sqlx and `memory` keeps everything in a process-local
//! store for tests and local runs.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{
    AuditEntry, AuditEntryChanges, Category, CategoryChanges, NewAuditEntry, NewCategory,
    NewPublication, NewReport, NewTransaction, NewUser, Publication, PublicationChanges, Report,
    ReportChanges, Transaction, TransactionChanges, User, UserChanges,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;

/// Errors raised by storage adapters
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored value that cannot be mapped onto the domain
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Unique constraint rejected the write
    #[error("Duplicate value for {0}")]
    Duplicate(&'static str),

    /// Backend cannot serve requests
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

// =========================================================================
// Ports
// =========================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return its id
    async fn create(&self, user: NewUser) -> RepositoryResult<i32>;

    /// Apply a partial update; `false` when no row matched
    async fn update(&self, id: i32, changes: UserChanges) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn find_all(&self) -> RepositoryResult<Vec<User>>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: NewCategory) -> RepositoryResult<i32>;

    async fn update(&self, id: i32, changes: CategoryChanges) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Category>>;

    async fn find_all(&self) -> RepositoryResult<Vec<Category>>;
}

/// Reads join the owner and the category
#[async_trait]
pub trait PublicationRepository: Send + Sync {
    async fn create(&self, publication: NewPublication) -> RepositoryResult<i32>;

    async fn update(&self, id: i32, changes: PublicationChanges) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Publication>>;

    async fn find_all(&self) -> RepositoryResult<Vec<Publication>>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create(&self, transaction: NewTransaction) -> RepositoryResult<i32>;

    async fn update(&self, id: i32, changes: TransactionChanges) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Transaction>>;

    async fn find_all(&self) -> RepositoryResult<Vec<Transaction>>;
}

/// Reads join the reporting user and the publication
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn create(&self, report: NewReport) -> RepositoryResult<i32>;

    async fn update(&self, id: i32, changes: ReportChanges) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Report>>;

    async fn find_all(&self) -> RepositoryResult<Vec<Report>>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn create(&self, entry: NewAuditEntry) -> RepositoryResult<i32>;

    async fn update(&self, id: i32, changes: AuditEntryChanges) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<AuditEntry>>;

    /// Newest first
    async fn find_all(&self) -> RepositoryResult<Vec<AuditEntry>>;
}

// =========================================================================
// Wiring
// =========================================================================

/// One handle per table, shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub publications: Arc<dyn PublicationRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub audits: Arc<dyn AuditRepository>,
}

impl Repositories {
    /// PostgreSQL adapters sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            categories: Arc::new(postgres::PgCategoryRepository::new(pool.clone())),
            publications: Arc::new(postgres::PgPublicationRepository::new(pool.clone())),
            transactions: Arc::new(postgres::PgTransactionRepository::new(pool.clone())),
            reports: Arc::new(postgres::PgReportRepository::new(pool.clone())),
            audits: Arc::new(postgres::PgAuditRepository::new(pool)),
        }
    }

    /// Every table backed by the same in-memory store
    pub fn in_memory() -> Self {
        Self::from_store(MemoryStore::new())
    }

    pub fn from_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            categories: store.clone(),
            publications: store.clone(),
            transactions: store.clone(),
            reports: store.clone(),
            audits: store,
        }
    }

    /// Replace the audit adapter
    pub fn with_audits(mut self, audits: Arc<dyn AuditRepository>) -> Self {
        self.audits = audits;
        self
    }
}
