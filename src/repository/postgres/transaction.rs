use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewTransaction, Transaction, TransactionChanges};
use crate::repository::{RepositoryResult, TransactionRepository};

const SELECT_TRANSACTION: &str = r#"
    SELECT id_transaccion, publicacion_id, donante_vendedor_id,
           beneficiario_comprador_id, estado, fecha_transaccion
    FROM transaccion
"#;

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id_transaccion: i32,
    publicacion_id: i32,
    donante_vendedor_id: i32,
    beneficiario_comprador_id: i32,
    estado: i32,
    fecha_transaccion: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id_transaccion,
            publication_id: row.publicacion_id,
            donor_id: row.donante_vendedor_id,
            beneficiary_id: row.beneficiario_comprador_id,
            status: row.estado,
            transacted_at: row.fecha_transaccion,
        }
    }
}

/// `transaccion` table
#[derive(Debug, Clone)]
pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn create(&self, transaction: NewTransaction) -> RepositoryResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO transaccion (
                publicacion_id, donante_vendedor_id, beneficiario_comprador_id,
                estado, fecha_transaccion
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id_transaccion
            "#,
        )
        .bind(transaction.publication_id)
        .bind(transaction.donor_id)
        .bind(transaction.beneficiary_id)
        .bind(transaction.status)
        .bind(transaction.transacted_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: i32, changes: TransactionChanges) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE transaccion SET
                publicacion_id = COALESCE($2, publicacion_id),
                donante_vendedor_id = COALESCE($3, donante_vendedor_id),
                beneficiario_comprador_id = COALESCE($4, beneficiario_comprador_id),
                estado = COALESCE($5, estado),
                fecha_transaccion = COALESCE($6, fecha_transaccion)
            WHERE id_transaccion = $1
            "#,
        )
        .bind(id)
        .bind(changes.publication_id)
        .bind(changes.donor_id)
        .bind(changes.beneficiary_id)
        .bind(changes.status)
        .bind(changes.transacted_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Transaction>> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{SELECT_TRANSACTION} WHERE id_transaccion = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Transaction::from))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> =
            sqlx::query_as(&format!("{SELECT_TRANSACTION} ORDER BY id_transaccion"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }
}
