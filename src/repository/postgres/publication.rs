use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::{Category, NewPublication, Publication, PublicationChanges, UserSummary};
use crate::repository::{PublicationRepository, RepositoryResult};

const SELECT_PUBLICATION: &str = r#"
    SELECT p.id_publicacion, p.usuario_id, p.categoria_id, p.titulo, p.descripcion,
           p.tipo, p.cantidad, p.precio, p.fecha_caducidad, p.estado,
           p.fecha_creacion, p.fecha_actualizacion,
           u.tipo_entidad AS owner_entity_type, u.nombre_entidad AS owner_name,
           u.correo AS owner_email, u.telefono AS owner_phone,
           u.ubicacion AS owner_location,
           c.nombre AS category_name, c.descripcion AS category_description,
           c.estado AS category_status
    FROM publicacion p
    LEFT JOIN usuarios u ON u.id_usuario = p.usuario_id
    LEFT JOIN categoria c ON c.id_categoria = p.categoria_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct PublicationRow {
    id_publicacion: i32,
    usuario_id: i32,
    categoria_id: i32,
    titulo: String,
    descripcion: Option<String>,
    tipo: String,
    cantidad: String,
    precio: Decimal,
    fecha_caducidad: NaiveDate,
    estado: i32,
    fecha_creacion: NaiveDateTime,
    fecha_actualizacion: NaiveDateTime,
    owner_entity_type: Option<String>,
    owner_name: Option<String>,
    owner_email: Option<String>,
    owner_phone: Option<String>,
    owner_location: Option<String>,
    category_name: Option<String>,
    category_description: Option<String>,
    category_status: Option<i32>,
}

impl From<PublicationRow> for Publication {
    fn from(row: PublicationRow) -> Self {
        // LEFT JOIN: the email column is NOT NULL, so its absence means no owner row
        let owner = row.owner_email.map(|email| UserSummary {
            id: row.usuario_id,
            entity_type: row.owner_entity_type.unwrap_or_default(),
            name: row.owner_name.unwrap_or_default(),
            email,
            phone: row.owner_phone.unwrap_or_default(),
            location: row.owner_location.unwrap_or_default(),
        });

        let category = row.category_name.map(|name| Category {
            id: row.categoria_id,
            name,
            description: row.category_description.unwrap_or_default(),
            status: row.category_status.unwrap_or_default(),
        });

        Self {
            id: row.id_publicacion,
            owner_id: row.usuario_id,
            category_id: row.categoria_id,
            title: row.titulo,
            description: row.descripcion.unwrap_or_default(),
            kind: row.tipo,
            quantity: row.cantidad,
            price: row.precio,
            expires_on: row.fecha_caducidad,
            status: row.estado,
            created_at: row.fecha_creacion.and_utc(),
            updated_at: row.fecha_actualizacion.and_utc(),
            owner,
            category,
        }
    }
}

/// `publicacion` table
#[derive(Debug, Clone)]
pub struct PgPublicationRepository {
    pool: PgPool,
}

impl PgPublicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PublicationRepository for PgPublicationRepository {
    async fn create(&self, publication: NewPublication) -> RepositoryResult<i32> {
        let now = Utc::now().naive_utc();

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO publicacion (
                usuario_id, categoria_id, titulo, descripcion, tipo, cantidad,
                precio, fecha_caducidad, estado, fecha_creacion, fecha_actualizacion
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING id_publicacion
            "#,
        )
        .bind(publication.owner_id)
        .bind(publication.category_id)
        .bind(&publication.title)
        .bind(&publication.description)
        .bind(&publication.kind)
        .bind(&publication.quantity)
        .bind(publication.price)
        .bind(publication.expires_on)
        .bind(publication.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: i32, changes: PublicationChanges) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE publicacion SET
                usuario_id = COALESCE($2, usuario_id),
                categoria_id = COALESCE($3, categoria_id),
                titulo = COALESCE($4, titulo),
                descripcion = COALESCE($5, descripcion),
                tipo = COALESCE($6, tipo),
                cantidad = COALESCE($7, cantidad),
                precio = COALESCE($8, precio),
                fecha_caducidad = COALESCE($9, fecha_caducidad),
                estado = COALESCE($10, estado),
                fecha_actualizacion = $11
            WHERE id_publicacion = $1
            "#,
        )
        .bind(id)
        .bind(changes.owner_id)
        .bind(changes.category_id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.kind)
        .bind(changes.quantity)
        .bind(changes.price)
        .bind(changes.expires_on)
        .bind(changes.status)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Publication>> {
        let row: Option<PublicationRow> =
            sqlx::query_as(&format!("{SELECT_PUBLICATION} WHERE p.id_publicacion = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Publication::from))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Publication>> {
        let rows: Vec<PublicationRow> =
            sqlx::query_as(&format!("{SELECT_PUBLICATION} ORDER BY p.id_publicacion"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Publication::from).collect())
    }
}
