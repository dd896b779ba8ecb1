//! Account registration, login and maintenance

use std::sync::Arc;

use chrono::Utc;

use crate::auth::{hash_password, verify_password, TokenService};
use crate::domain::{status, DomainError, DomainResult, NewUser, User, UserChanges};
use crate::repository::{RepositoryError, UserRepository};

use super::commands::{RegisterUserCommand, UpdateUserCommand};

const USER_NOT_FOUND: &str = "Usuario no encontrado";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Register an account; the email must be unused
    pub async fn create(&self, command: RegisterUserCommand) -> DomainResult<i32> {
        if self.users.find_by_email(&command.email).await?.is_some() {
            return Err(DomainError::UserAlreadyExists);
        }

        let password_hash = hash_password(&command.password).await?;

        let id = self
            .users
            .create(NewUser {
                entity_type: command.entity_type,
                name: command.name,
                email: command.email,
                phone: command.phone,
                location: command.location,
                address: command.address,
                password_hash,
                status: status::ACTIVE,
                registered_at: Utc::now(),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Duplicate(_) => DomainError::UserAlreadyExists,
                other => other.into(),
            })?;

        tracing::info!(user_id = id, "User registered");
        Ok(id)
    }

    /// Check an email/password pair against the stored hash
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<User> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(DomainError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Token for valid credentials
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<String> {
        let (token, _) = self.login_with_user(email, password).await?;
        Ok(token)
    }

    pub async fn login_with_user(&self, email: &str, password: &str) -> DomainResult<(String, User)> {
        let user = self.authenticate(email, password).await?;
        let token = self.tokens.issue(user.id, &user.email)?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok((token, user))
    }

    /// Apply a partial update; the account is left active
    pub async fn update(&self, id: i32, command: UpdateUserCommand) -> DomainResult<bool> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(USER_NOT_FOUND));
        }

        if let Some(email) = &command.email {
            if let Some(owner) = self.users.find_by_email(email).await? {
                if owner.id != id {
                    return Err(DomainError::EmailInUse);
                }
            }
        }

        let password_hash = match &command.password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let changes = UserChanges {
            entity_type: command.entity_type,
            name: command.name,
            email: command.email,
            phone: command.phone,
            location: command.location,
            address: command.address,
            password_hash,
            status: Some(status::ACTIVE),
        };

        let updated = self.users.update(id, changes).await.map_err(|e| match e {
            RepositoryError::Duplicate(_) => DomainError::EmailInUse,
            other => other.into(),
        })?;
        if !updated {
            return Err(DomainError::not_found(USER_NOT_FOUND));
        }

        tracing::info!(user_id = id, "User updated");
        Ok(true)
    }

    /// Soft delete
    pub async fn delete(&self, id: i32) -> DomainResult<bool> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(USER_NOT_FOUND));
        }

        if !self.users.update(id, UserChanges::deactivate()).await? {
            return Err(DomainError::not_found(USER_NOT_FOUND));
        }

        tracing::info!(user_id = id, "User deactivated");
        Ok(true)
    }

    /// Replace the stored hash for the account owning `email`
    pub async fn reset_password(&self, email: &str, new_password: &str) -> DomainResult<i32> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        let password_hash = hash_password(new_password).await?;
        if !self.users.update(user.id, UserChanges::password(password_hash)).await? {
            return Err(DomainError::not_found(USER_NOT_FOUND));
        }

        tracing::info!(user_id = user.id, "Password reset");
        Ok(user.id)
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }

    pub async fn get_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.users.find_by_email(email).await?)
    }

    pub async fn get_all(&self) -> DomainResult<Vec<User>> {
        Ok(self.users.find_all().await?)
    }
}
