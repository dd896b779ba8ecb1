//! `/register`, `/login` and `/users`

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::api::requests::{self, parse_id};
use crate::api::state::AppState;
use crate::audit::{tables, AuditRecord};
use crate::domain::{AuditAction, DomainError, OperationContext, User};
use crate::error::{AppError, AppResult};

use super::MessageResponse;

const USER_NOT_FOUND: &str = "Usuario no encontrado";
const INVALID_PARAM: &str = "Error en parámetro";

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    #[serde(rename = "userId")]
    pub user_id: i32,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct PasswordResetResponse {
    pub message: &'static str,
    #[serde(rename = "userId")]
    pub user_id: i32,
}

async fn find_user(state: &AppState, id: i32) -> AppResult<Json<User>> {
    state
        .users
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
}

async fn deactivate(state: &AppState, id: i32, context: &OperationContext) -> AppResult<Json<MessageResponse>> {
    state.users.delete(id).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Delete)
                .table(tables::USERS)
                .record_id(id)
                .description(format!("Usuario dado de baja con id {id}")),
            context,
        )
        .await;

    Ok(MessageResponse::new("Usuario dado de baja exitosamente"))
}

// =========================================================================
// POST /register, POST /users
// =========================================================================

pub async fn register(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let body = requests::parse_body(&body)?;
    let command = requests::register_command(&body)?;
    let email = command.email.clone();

    let user_id = state.users.create(command).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Create)
                .table(tables::USERS)
                .record_id(user_id)
                .description(format!("Usuario registrado: {email}")),
            &context,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Usuario registrado correctamente",
            user_id,
        }),
    ))
}

// =========================================================================
// POST /login
// =========================================================================

pub async fn login(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    body: Bytes,
) -> AppResult<Json<LoginResponse>> {
    let body = requests::parse_body(&body)?;
    let (email, password) = requests::credentials(&body)
        .ok_or_else(|| AppError::validation("Email y contraseña son requeridos"))?;

    let (token, user) = match state.users.login_with_user(&email, &password).await {
        Ok(found) => found,
        Err(DomainError::InvalidCredentials) => {
            return Err(AppError::Unauthorized("Invalid Credentials".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Auth)
                .table(tables::USERS)
                .record_id(user.id)
                .description(format!("Inicio de sesión de {}", user.email)),
            &context.with_actor(user.id),
        )
        .await;

    Ok(Json(LoginResponse { token }))
}

// =========================================================================
// Reads
// =========================================================================

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.get_all().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    let id = parse_id(&id, INVALID_PARAM)?;
    find_user(&state, id).await
}

pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<User>> {
    state
        .users
        .get_by_email(email.trim())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
}

pub async fn query_user_by_id(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<User>> {
    let id = params
        .get("id")
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or_else(|| AppError::validation("Query param 'id' inválido"))?;
    find_user(&state, id).await
}

pub async fn query_user_by_email(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<User>> {
    let email = params
        .get("email")
        .map(|raw| raw.trim())
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::validation("Query param 'email' es requerido"))?;

    state
        .users
        .get_by_email(email)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
}

// =========================================================================
// Mutations
// =========================================================================

pub async fn update_user(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_PARAM)?;
    let body = requests::parse_body(&body)?;
    let command = requests::update_user_command(&body)?;

    state.users.update(id, command).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Update)
                .table(tables::USERS)
                .record_id(id)
                .description(format!("Usuario actualizado con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Usuario actualizado con éxito"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_PARAM)?;
    deactivate(&state, id, &context).await
}

pub async fn query_delete_user(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<MessageResponse>> {
    let id = params
        .get("id")
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or_else(|| AppError::validation("Query param 'id' inválido"))?;
    deactivate(&state, id, &context).await
}

pub async fn reset_password(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    body: Bytes,
) -> AppResult<Json<PasswordResetResponse>> {
    let body = requests::parse_body(&body)?;
    let (email, password) = requests::password_reset(&body)?;

    let user_id = state.users.reset_password(&email, &password).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Update)
                .table(tables::USERS)
                .record_id(user_id)
                .description(format!("Contraseña restablecida para el usuario {user_id}")),
            &context,
        )
        .await;

    Ok(Json(PasswordResetResponse {
        message: "Contraseña actualizada correctamente",
        user_id,
    }))
}
