//! In-memory adapter
//!
//! Implements every port over one mutex-guarded set of tables so joined
//! reads see the same data the writes produced. Ids are assigned from a
//! per-table sequence starting at 1, like `SERIAL`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    AuditEntry, AuditEntryChanges, Category, CategoryChanges, NewAuditEntry, NewCategory,
    NewPublication, NewReport, NewTransaction, NewUser, Publication, PublicationChanges, Report,
    ReportChanges, Transaction, TransactionChanges, User, UserChanges,
};

use super::{
    AuditRepository, CategoryRepository, PublicationRepository, ReportRepository,
    RepositoryError, RepositoryResult, TransactionRepository, UserRepository,
};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i32) -> T) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, build(id));
        id
    }

    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    /// `false` when the id is unknown
    fn modify(&mut self, id: i32, apply: impl FnOnce(&mut T)) -> bool {
        match self.rows.get_mut(&id) {
            Some(row) => {
                apply(row);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    categories: Table<Category>,
    publications: Table<Publication>,
    transactions: Table<Transaction>,
    reports: Table<Report>,
    audits: Table<AuditEntry>,
}

impl Tables {
    /// Mirrors the unique constraint on `usuarios.correo`
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn join_publication(&self, mut publication: Publication) -> Publication {
        publication.owner = self.users.get(publication.owner_id).map(|u| u.summary());
        publication.category = self.categories.get(publication.category_id);
        publication
    }

    fn join_report(&self, mut report: Report) -> Report {
        report.reporter = self.users.get(report.reporter_id).map(|u| u.summary());
        report.publication = self
            .publications
            .get(report.publication_id)
            .map(|p| p.summary());
        report
    }
}

/// Process-local storage for every table
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> RepositoryResult<i32> {
        let mut tables = self.lock()?;
        if tables.email_taken(&user.email, None) {
            return Err(RepositoryError::Duplicate("correo"));
        }
        Ok(tables.users.insert_with(|id| User {
            id,
            entity_type: user.entity_type,
            name: user.name,
            email: user.email,
            phone: user.phone,
            location: user.location,
            address: user.address,
            password_hash: user.password_hash,
            status: user.status,
            registered_at: user.registered_at,
        }))
    }

    async fn update(&self, id: i32, changes: UserChanges) -> RepositoryResult<bool> {
        let mut tables = self.lock()?;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(RepositoryError::Duplicate("correo"));
            }
        }
        Ok(tables.users.modify(id, |user| changes.apply_to(user)))
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<User>> {
        Ok(self.lock()?.users.get(id))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.lock()?.users.all())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, category: NewCategory) -> RepositoryResult<i32> {
        let mut tables = self.lock()?;
        Ok(tables.categories.insert_with(|id| Category {
            id,
            name: category.name,
            description: category.description,
            status: category.status,
        }))
    }

    async fn update(&self, id: i32, changes: CategoryChanges) -> RepositoryResult<bool> {
        let mut tables = self.lock()?;
        Ok(tables.categories.modify(id, |category| changes.apply_to(category)))
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Category>> {
        Ok(self.lock()?.categories.get(id))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Category>> {
        Ok(self.lock()?.categories.all())
    }
}

#[async_trait]
impl PublicationRepository for MemoryStore {
    async fn create(&self, publication: NewPublication) -> RepositoryResult<i32> {
        let now = Utc::now();
        let mut tables = self.lock()?;
        Ok(tables.publications.insert_with(|id| Publication {
            id,
            owner_id: publication.owner_id,
            category_id: publication.category_id,
            title: publication.title,
            description: publication.description,
            kind: publication.kind,
            quantity: publication.quantity,
            price: publication.price,
            expires_on: publication.expires_on,
            status: publication.status,
            created_at: now,
            updated_at: now,
            owner: None,
            category: None,
        }))
    }

    async fn update(&self, id: i32, changes: PublicationChanges) -> RepositoryResult<bool> {
        let mut tables = self.lock()?;
        Ok(tables.publications.modify(id, |publication| {
            changes.apply_to(publication);
            publication.updated_at = Utc::now();
        }))
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Publication>> {
        let tables = self.lock()?;
        Ok(tables
            .publications
            .get(id)
            .map(|p| tables.join_publication(p)))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Publication>> {
        let tables = self.lock()?;
        Ok(tables
            .publications
            .all()
            .into_iter()
            .map(|p| tables.join_publication(p))
            .collect())
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn create(&self, transaction: NewTransaction) -> RepositoryResult<i32> {
        let mut tables = self.lock()?;
        Ok(tables.transactions.insert_with(|id| Transaction {
            id,
            publication_id: transaction.publication_id,
            donor_id: transaction.donor_id,
            beneficiary_id: transaction.beneficiary_id,
            status: transaction.status,
            transacted_at: transaction.transacted_at,
        }))
    }

    async fn update(&self, id: i32, changes: TransactionChanges) -> RepositoryResult<bool> {
        let mut tables = self.lock()?;
        Ok(tables.transactions.modify(id, |t| changes.apply_to(t)))
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Transaction>> {
        Ok(self.lock()?.transactions.get(id))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Transaction>> {
        Ok(self.lock()?.transactions.all())
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn create(&self, report: NewReport) -> RepositoryResult<i32> {
        let mut tables = self.lock()?;
        Ok(tables.reports.insert_with(|id| Report {
            id,
            reporter_id: report.reporter_id,
            publication_id: report.publication_id,
            description: report.description,
            status: report.status,
            reported_at: report.reported_at,
            reporter: None,
            publication: None,
        }))
    }

    async fn update(&self, id: i32, changes: ReportChanges) -> RepositoryResult<bool> {
        let mut tables = self.lock()?;
        Ok(tables.reports.modify(id, |report| changes.apply_to(report)))
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Report>> {
        let tables = self.lock()?;
        Ok(tables.reports.get(id).map(|r| tables.join_report(r)))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Report>> {
        let tables = self.lock()?;
        Ok(tables
            .reports
            .all()
            .into_iter()
            .map(|r| tables.join_report(r))
            .collect())
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn create(&self, entry: NewAuditEntry) -> RepositoryResult<i32> {
        let mut tables = self.lock()?;
        Ok(tables.audits.insert_with(|id| AuditEntry {
            id,
            actor_id: entry.actor_id,
            table: entry.table,
            record_id: entry.record_id,
            action: entry.action,
            description: entry.description,
            status: entry.status,
            recorded_at: entry.recorded_at,
        }))
    }

    async fn update(&self, id: i32, changes: AuditEntryChanges) -> RepositoryResult<bool> {
        let mut tables = self.lock()?;
        Ok(tables.audits.modify(id, |entry| changes.apply_to(entry)))
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<AuditEntry>> {
        Ok(self.lock()?.audits.get(id))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<AuditEntry>> {
        let mut entries = self.lock()?.audits.all();
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }
}
