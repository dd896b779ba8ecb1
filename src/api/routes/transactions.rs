//! `/transacciones`
//!
//! A stored transaction pauses its publication. The pause is a follow-up
//! step: its failure is logged and the transaction stands.

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::api::requests::{self, parse_id};
use crate::api::state::AppState;
use crate::audit::{tables, AuditRecord};
use crate::domain::{AuditAction, OperationContext, Transaction};
use crate::error::{AppError, AppResult};

use super::{CreatedResponse, MessageResponse};

const INVALID_ID: &str = "Id inválido";
const TRANSACTION_NOT_FOUND: &str = "Transacción no encontrada";

pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let body = requests::parse_body(&body)?;
    let transaction = requests::new_transaction(&body)?;
    let publication_id = transaction.publication_id;

    let id = state.transactions.create(transaction).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Create)
                .table(tables::TRANSACTIONS)
                .record_id(id)
                .description(format!(
                    "Transacción creada con id {id} sobre la publicación {publication_id}"
                )),
            &context,
        )
        .await;

    state
        .publications
        .pause_after_transaction(publication_id, id, &context)
        .await;

    Ok((StatusCode::CREATED, CreatedResponse::new("Transacción creada", id)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Transaction>>> {
    Ok(Json(state.transactions.get_all().await?))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Transaction>> {
    let id = parse_id(&id, INVALID_ID)?;
    state
        .transactions
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(TRANSACTION_NOT_FOUND))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;
    let body = requests::parse_body(&body)?;
    let changes = requests::transaction_changes(&body)?;

    state.transactions.update(id, changes).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Update)
                .table(tables::TRANSACTIONS)
                .record_id(id)
                .description(format!("Transacción actualizada con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Transacción actualizada"))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;

    state.transactions.delete(id).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Delete)
                .table(tables::TRANSACTIONS)
                .record_id(id)
                .description(format!("Transacción eliminada con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Transacción eliminada"))
}
