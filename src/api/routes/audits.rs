//! `/auditorias`

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::api::requests::{self, parse_id};
use crate::api::state::AppState;
use crate::audit::{tables, AuditRecord};
use crate::domain::{AuditAction, AuditEntry, OperationContext};
use crate::error::{AppError, AppResult};

use super::{CreatedResponse, MessageResponse};

const INVALID_ID: &str = "Id inválido";

pub async fn create_audit(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let body = requests::parse_body(&body)?;
    let mut entry = requests::new_audit_entry(&body)?;
    if entry.actor_id.is_none() {
        entry.actor_id = context.actor_id;
    }

    let id = state.audits.create(entry).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Create)
                .table(tables::AUDITS)
                .record_id(id)
                .description(format!("Auditoría creada con id {id}")),
            &context,
        )
        .await;

    Ok((StatusCode::CREATED, CreatedResponse::new("Auditoría creada", id)))
}

pub async fn list_audits(State(state): State<AppState>) -> AppResult<Json<Vec<AuditEntry>>> {
    Ok(Json(state.audits.get_all().await?))
}

pub async fn get_audit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AuditEntry>> {
    let id = parse_id(&id, INVALID_ID)?;
    state
        .audits
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("No encontrada"))
}

pub async fn update_audit(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;
    let body = requests::parse_body(&body)?;
    let changes = requests::audit_changes(&body)?;

    state.audits.update(id, changes).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Update)
                .table(tables::AUDITS)
                .record_id(id)
                .description(format!("Auditoría actualizada con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Actualizado"))
}

pub async fn delete_audit(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;

    state.audits.delete(id).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Delete)
                .table(tables::AUDITS)
                .record_id(id)
                .description(format!("Auditoría eliminada con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Eliminada"))
}
