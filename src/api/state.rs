//! Shared application state
//!
//! Built once at startup and handed to every handler and middleware.

use std::sync::Arc;

use crate::audit::AuditRecorder;
use crate::auth::TokenService;
use crate::repository::Repositories;
use crate::services::{
    AuditService, CategoryService, PublicationService, ReportService, TransactionService,
    UserService,
};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub users: UserService,
    pub categories: CategoryService,
    pub publications: PublicationService,
    pub transactions: TransactionService,
    pub reports: ReportService,
    pub audits: AuditService,
    pub recorder: AuditRecorder,
    pub tokens: TokenService,
    /// Write one audit entry per HTTP exchange
    pub audit_requests: bool,
}

impl AppStateInner {
    /// Wire services over the given adapters
    pub fn build(repos: Repositories, tokens: TokenService, audit_requests: bool) -> AppState {
        let recorder = AuditRecorder::new(repos.audits.clone());

        Arc::new(Self {
            users: UserService::new(repos.users.clone(), tokens.clone()),
            categories: CategoryService::new(repos.categories.clone()),
            publications: PublicationService::new(repos.publications.clone(), recorder.clone()),
            transactions: TransactionService::new(repos.transactions.clone(), repos.publications),
            reports: ReportService::new(repos.reports.clone()),
            audits: AuditService::new(repos.audits),
            recorder,
            tokens,
            audit_requests,
        })
    }
}
