use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{AuditAction, AuditEntry, AuditEntryChanges, NewAuditEntry};
use crate::repository::{AuditRepository, RepositoryError, RepositoryResult};

const SELECT_AUDIT: &str = r#"
    SELECT id_log, usuario_id, tabla_afectada, registro_id, accion,
           descripcion, estado, fecha
    FROM auditoria
"#;

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id_log: i32,
    usuario_id: Option<i32>,
    tabla_afectada: String,
    registro_id: Option<i32>,
    accion: String,
    descripcion: String,
    estado: i32,
    fecha: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = RepositoryError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action: AuditAction = row.accion.parse().map_err(RepositoryError::InvalidRow)?;

        Ok(Self {
            id: row.id_log,
            actor_id: row.usuario_id,
            table: row.tabla_afectada,
            record_id: row.registro_id,
            action,
            description: row.descripcion,
            status: row.estado,
            recorded_at: row.fecha,
        })
    }
}

/// `auditoria` table
#[derive(Debug, Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn create(&self, entry: NewAuditEntry) -> RepositoryResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO auditoria (
                usuario_id, tabla_afectada, registro_id, accion, descripcion, estado, fecha
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id_log
            "#,
        )
        .bind(entry.actor_id)
        .bind(&entry.table)
        .bind(entry.record_id)
        .bind(entry.action.as_str())
        .bind(&entry.description)
        .bind(entry.status)
        .bind(entry.recorded_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: i32, changes: AuditEntryChanges) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE auditoria SET
                usuario_id = COALESCE($2, usuario_id),
                tabla_afectada = COALESCE($3, tabla_afectada),
                registro_id = COALESCE($4, registro_id),
                accion = COALESCE($5, accion),
                descripcion = COALESCE($6, descripcion),
                estado = COALESCE($7, estado),
                fecha = COALESCE($8, fecha)
            WHERE id_log = $1
            "#,
        )
        .bind(id)
        .bind(changes.actor_id)
        .bind(changes.table)
        .bind(changes.record_id)
        .bind(changes.action.map(|action| action.as_str()))
        .bind(changes.description)
        .bind(changes.status)
        .bind(changes.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<AuditEntry>> {
        let row: Option<AuditRow> = sqlx::query_as(&format!("{SELECT_AUDIT} WHERE id_log = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AuditEntry::try_from).transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<AuditEntry>> {
        let rows: Vec<AuditRow> =
            sqlx::query_as(&format!("{SELECT_AUDIT} ORDER BY fecha DESC, id_log DESC"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }
}
