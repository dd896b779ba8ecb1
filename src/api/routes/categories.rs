//! `/categorias`

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::api::requests::{self, parse_id};
use crate::api::state::AppState;
use crate::audit::{tables, AuditRecord};
use crate::domain::{AuditAction, Category, OperationContext};
use crate::error::{AppError, AppResult};

use super::{CreatedResponse, MessageResponse};

const INVALID_ID: &str = "Id inválido";

pub async fn create_category(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let body = requests::parse_body(&body)?;
    let category = requests::new_category(&body)?;
    let name = category.name.clone();

    let id = state.categories.create(category).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Create)
                .table(tables::CATEGORIES)
                .record_id(id)
                .description(format!("Categoría creada: {name}")),
            &context,
        )
        .await;

    Ok((StatusCode::CREATED, CreatedResponse::new("Categoría creada", id)))
}

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.categories.get_all().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let id = parse_id(&id, INVALID_ID)?;
    state
        .categories
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("No encontrada"))
}

pub async fn update_category(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;
    let body = requests::parse_body(&body)?;
    let changes = requests::category_changes(&body)?;

    state.categories.update(id, changes).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Update)
                .table(tables::CATEGORIES)
                .record_id(id)
                .description(format!("Categoría actualizada con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Actualizada"))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;

    state.categories.delete(id).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Delete)
                .table(tables::CATEGORIES)
                .record_id(id)
                .description(format!("Categoría eliminada con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Eliminada"))
}
