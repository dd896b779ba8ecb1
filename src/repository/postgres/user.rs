use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewUser, User, UserChanges};
use crate::repository::{RepositoryError, RepositoryResult, UserRepository};

const SELECT_USER: &str = r#"
    SELECT id_usuario, tipo_entidad, nombre_entidad, correo, telefono,
           ubicacion, direccion, password, estado, fecha_registro
    FROM usuarios
"#;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id_usuario: i32,
    tipo_entidad: String,
    nombre_entidad: String,
    correo: String,
    telefono: Option<String>,
    ubicacion: Option<String>,
    direccion: Option<String>,
    password: String,
    estado: i32,
    fecha_registro: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id_usuario,
            entity_type: row.tipo_entidad,
            name: row.nombre_entidad,
            email: row.correo,
            phone: row.telefono.unwrap_or_default(),
            location: row.ubicacion.unwrap_or_default(),
            address: row.direccion.unwrap_or_default(),
            password_hash: row.password,
            status: row.estado,
            registered_at: row.fecha_registro,
        }
    }
}

/// A racing writer that slipped past the service-level email check
fn duplicate_email(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Duplicate("correo")
        }
        _ => RepositoryError::Database(e),
    }
}

/// `usuarios` table
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> RepositoryResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO usuarios (
                tipo_entidad, nombre_entidad, correo, telefono, ubicacion,
                direccion, password, estado, fecha_registro
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id_usuario
            "#,
        )
        .bind(&user.entity_type)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.location)
        .bind(&user.address)
        .bind(&user.password_hash)
        .bind(user.status)
        .bind(user.registered_at)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_email)?;

        tracing::debug!(user_id = id, "User row inserted");
        Ok(id)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE usuarios SET
                tipo_entidad = COALESCE($2, tipo_entidad),
                nombre_entidad = COALESCE($3, nombre_entidad),
                correo = COALESCE($4, correo),
                telefono = COALESCE($5, telefono),
                ubicacion = COALESCE($6, ubicacion),
                direccion = COALESCE($7, direccion),
                password = COALESCE($8, password),
                estado = COALESCE($9, estado)
            WHERE id_usuario = $1
            "#,
        )
        .bind(id)
        .bind(changes.entity_type)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.phone)
        .bind(changes.location)
        .bind(changes.address)
        .bind(changes.password_hash)
        .bind(changes.status)
        .execute(&self.pool)
        .await
        .map_err(duplicate_email)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{SELECT_USER} WHERE id_usuario = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE correo = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("{SELECT_USER} ORDER BY id_usuario"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
