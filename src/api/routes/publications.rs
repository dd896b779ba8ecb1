//! `/publicaciones`

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::api::requests::{self, parse_id};
use crate::api::state::AppState;
use crate::audit::{tables, AuditRecord};
use crate::domain::{AuditAction, OperationContext, Publication};
use crate::error::{AppError, AppResult};

use super::{CreatedResponse, MessageResponse};

const INVALID_ID: &str = "Id inválido";

pub async fn create_publication(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let body = requests::parse_body(&body)?;
    let publication = requests::new_publication(&body)?;
    let title = publication.title.clone();

    let id = state.publications.create(publication).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Create)
                .table(tables::PUBLICATIONS)
                .record_id(id)
                .description(format!("Publicación creada: {title}")),
            &context,
        )
        .await;

    Ok((StatusCode::CREATED, CreatedResponse::new("Publicación creada", id)))
}

pub async fn list_publications(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Publication>>> {
    Ok(Json(state.publications.get_all().await?))
}

pub async fn get_publication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Publication>> {
    let id = parse_id(&id, INVALID_ID)?;
    state
        .publications
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("No encontrada"))
}

pub async fn update_publication(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;
    let body = requests::parse_body(&body)?;
    let changes = requests::publication_changes(&body)?;

    state.publications.update(id, changes).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Update)
                .table(tables::PUBLICATIONS)
                .record_id(id)
                .description(format!("Publicación actualizada con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Publicación actualizada"))
}

pub async fn delete_publication(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;

    state.publications.delete(id).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Delete)
                .table(tables::PUBLICATIONS)
                .record_id(id)
                .description(format!("Publicación eliminada con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Publicación eliminada"))
}
