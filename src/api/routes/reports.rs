//! `/reportes`

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
use crate::domain::{AuditAction, OperationContext, Report};
use crate::error::{AppError, AppResult};

use super::MessageResponse;

const INVALID_ID: &str = "Id inválido";
const REPORT_NOT_FOUND: &str = "Reporte no encontrado";

#[derive(Debug, Serialize)]
pub struct ReportCreatedResponse {
    pub message: &'static str,
    #[serde(rename = "reporteId")]
    pub report_id: i32,
}

fn query_id(params: &HashMap<String, String>) -> AppResult<i32> {
    params
        .get("id")
        .map(|raw| parse_id(raw, INVALID_ID))
        .unwrap_or_else(|| Err(AppError::validation(INVALID_ID)))
}

async fn find_report(state: &AppState, id: i32) -> AppResult<Json<Report>> {
    state
        .reports
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(REPORT_NOT_FOUND))
}

async fn remove_report(
    state: &AppState,
    id: i32,
    context: &OperationContext,
) -> AppResult<Json<MessageResponse>> {
    state.reports.delete(id).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Delete)
                .table(tables::REPORTS)
                .record_id(id)
                .description(format!("Reporte eliminado con id {id}")),
            context,
        )
        .await;

    Ok(MessageResponse::new("Reporte eliminado exitosamente"))
}

pub async fn create_report(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ReportCreatedResponse>)> {
    let body = requests::parse_body(&body)?;
    let report = requests::new_report(&body)?;

    let id = state.reports.create(report).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Create)
                .table(tables::REPORTS)
                .record_id(id)
                .description(format!("Reporte creado con id {id}")),
            &context,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ReportCreatedResponse {
            message: "Reporte creado correctamente",
            report_id: id,
        }),
    ))
}

pub async fn list_reports(State(state): State<AppState>) -> AppResult<Json<Vec<Report>>> {
    Ok(Json(state.reports.get_all().await?))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Report>> {
    let id = parse_id(&id, INVALID_ID)?;
    find_report(&state, id).await
}

pub async fn query_report_by_id(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Report>> {
    let id = query_id(&params)?;
    find_report(&state, id).await
}

pub async fn update_report(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;
    let body = requests::parse_body(&body)?;
    let changes = requests::report_changes(&body)?;

    state.reports.update(id, changes).await?;

    state
        .recorder
        .record(
            AuditRecord::new(AuditAction::Update)
                .table(tables::REPORTS)
                .record_id(id)
                .description(format!("Reporte actualizado con id {id}")),
            &context,
        )
        .await;

    Ok(MessageResponse::new("Reporte actualizado con éxito"))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_ID)?;
    remove_report(&state, id, &context).await
}

pub async fn query_delete_report(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<MessageResponse>> {
    let id = query_id(&params)?;
    remove_report(&state, id, &context).await
}
