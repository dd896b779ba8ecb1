//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

use foodloop::auth::TokenService;
use foodloop::domain::{status, AuditEntry, AuditEntryChanges, NewAuditEntry, UserChanges};
use foodloop::repository::{
    AuditRepository, Repositories, RepositoryError, RepositoryResult, UserRepository,
};
use foodloop::services::RegisterUserCommand;
use foodloop::{create_router, AppState, AppStateInner};

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub repos: Repositories,
}

impl TestApp {
    /// Router over a fresh in-memory store
    pub fn new() -> Self {
        Self::with_repositories(Repositories::in_memory())
    }

    pub fn with_repositories(repos: Repositories) -> Self {
        let state = AppStateInner::build(repos.clone(), TokenService::new(TEST_SECRET), false);
        let router = create_router(state.clone());
        Self {
            router,
            state,
            repos,
        }
    }

    /// Register an account with status 1 and return its id
    pub async fn seed_user(&self, email: &str, password: &str) -> i32 {
        self.state
            .users
            .create(RegisterUserCommand::new(
                "Usuario Prueba".to_string(),
                email.to_string(),
                password.to_string(),
            ))
            .await
            .expect("seed user")
    }

    /// Register an account and promote it to administrator
    pub async fn seed_admin(&self, email: &str, password: &str) -> i32 {
        let id = self.seed_user(email, password).await;
        let changes = UserChanges {
            status: Some(status::ADMINISTRATOR),
            ..UserChanges::default()
        };
        assert!(self.repos.users.update(id, changes).await.expect("promote admin"));
        id
    }

    /// Bearer token for an existing account
    pub async fn token_for(&self, email: &str, password: &str) -> String {
        self.state.users.login(email, password).await.expect("login")
    }

    /// Send one request and decode the JSON response (`Null` when empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

/// Audit storage that rejects every write
pub struct FailingAudits;

#[async_trait]
impl AuditRepository for FailingAudits {
    async fn create(&self, _entry: NewAuditEntry) -> RepositoryResult<i32> {
        Err(RepositoryError::Unavailable("audit table offline".to_string()))
    }

    async fn update(&self, _id: i32, _changes: AuditEntryChanges) -> RepositoryResult<bool> {
        Err(RepositoryError::Unavailable("audit table offline".to_string()))
    }

    async fn find_by_id(&self, _id: i32) -> RepositoryResult<Option<AuditEntry>> {
        Ok(None)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<AuditEntry>> {
        Ok(Vec::new())
    }
}

pub fn failing_audits() -> Arc<dyn AuditRepository> {
    Arc::new(FailingAudits)
}
