use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewReport, PublicationSummary, Report, ReportChanges, UserSummary};
use crate::repository::{ReportRepository, RepositoryResult};

const SELECT_REPORT: &str = r#"
    SELECT r.id_reporte, r.reportante_id, r.publicacion_id, r.descripcion,
           r.estado, r.fecha_reporte,
           u.tipo_entidad AS reporter_entity_type, u.nombre_entidad AS reporter_name,
           u.correo AS reporter_email, u.telefono AS reporter_phone,
           u.ubicacion AS reporter_location,
           p.usuario_id AS publication_owner_id, p.titulo AS publication_title,
           p.estado AS publication_status
    FROM reporte r
    LEFT JOIN usuarios u ON u.id_usuario = r.reportante_id
    LEFT JOIN publicacion p ON p.id_publicacion = r.publicacion_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id_reporte: i32,
    reportante_id: i32,
    publicacion_id: i32,
    descripcion: String,
    estado: i32,
    fecha_reporte: DateTime<Utc>,
    reporter_entity_type: Option<String>,
    reporter_name: Option<String>,
    reporter_email: Option<String>,
    reporter_phone: Option<String>,
    reporter_location: Option<String>,
    publication_owner_id: Option<i32>,
    publication_title: Option<String>,
    publication_status: Option<i32>,
}

impl From<ReportRow> for Report {
    fn from(row: ReportRow) -> Self {
        let reporter = row.reporter_email.map(|email| UserSummary {
            id: row.reportante_id,
            entity_type: row.reporter_entity_type.unwrap_or_default(),
            name: row.reporter_name.unwrap_or_default(),
            email,
            phone: row.reporter_phone.unwrap_or_default(),
            location: row.reporter_location.unwrap_or_default(),
        });

        let publication = row.publication_title.map(|title| PublicationSummary {
            id: row.publicacion_id,
            owner_id: row.publication_owner_id.unwrap_or_default(),
            title,
            status: row.publication_status.unwrap_or_default(),
        });

        Self {
            id: row.id_reporte,
            reporter_id: row.reportante_id,
            publication_id: row.publicacion_id,
            description: row.descripcion,
            status: row.estado,
            reported_at: row.fecha_reporte,
            reporter,
            publication,
        }
    }
}

/// `reporte` table
#[derive(Debug, Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, report: NewReport) -> RepositoryResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO reporte (reportante_id, publicacion_id, descripcion, estado, fecha_reporte)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id_reporte
            "#,
        )
        .bind(report.reporter_id)
        .bind(report.publication_id)
        .bind(&report.description)
        .bind(report.status)
        .bind(report.reported_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: i32, changes: ReportChanges) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reporte SET
                reportante_id = COALESCE($2, reportante_id),
                publicacion_id = COALESCE($3, publicacion_id),
                descripcion = COALESCE($4, descripcion),
                estado = COALESCE($5, estado),
                fecha_reporte = COALESCE($6, fecha_reporte)
            WHERE id_reporte = $1
            "#,
        )
        .bind(id)
        .bind(changes.reporter_id)
        .bind(changes.publication_id)
        .bind(changes.description)
        .bind(changes.status)
        .bind(changes.reported_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Report>> {
        let row: Option<ReportRow> =
            sqlx::query_as(&format!("{SELECT_REPORT} WHERE r.id_reporte = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Report::from))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Report>> {
        let rows: Vec<ReportRow> = sqlx::query_as(&format!("{SELECT_REPORT} ORDER BY r.id_reporte"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Report::from).collect())
    }
}
