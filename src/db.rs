//! Database module
//!
//! Pool construction and startup checks against the pre-existing schema.

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Tables the service reads and writes
pub const REQUIRED_TABLES: [&str; 6] = [
    "usuarios",
    "categoria",
    "publicacion",
    "transaccion",
    "reporte",
    "auditoria",
];

/// Open a connection pool with the configured schema on the search path
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect_with(config.connect_options())
        .await
}

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist in the schema
pub async fn check_schema(pool: &PgPool, schema: &str) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = $1 AND table_name = $2
            )
            "#,
        )
        .bind(schema)
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!(schema, table, "Required table does not exist");
            return Ok(false);
        }
    }

    tracing::info!(schema, "Schema verified");
    Ok(true)
}
