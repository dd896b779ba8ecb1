use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{Category, CategoryChanges, NewCategory};
use crate::repository::{CategoryRepository, RepositoryResult};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id_categoria: i32,
    nombre: String,
    descripcion: Option<String>,
    estado: i32,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id_categoria,
            name: row.nombre,
            description: row.descripcion.unwrap_or_default(),
            status: row.estado,
        }
    }
}

/// `categoria` table
#[derive(Debug, Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, category: NewCategory) -> RepositoryResult<i32> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO categoria (nombre, descripcion, estado) VALUES ($1, $2, $3) RETURNING id_categoria",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: i32, changes: CategoryChanges) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE categoria SET
                nombre = COALESCE($2, nombre),
                descripcion = COALESCE($3, descripcion),
                estado = COALESCE($4, estado)
            WHERE id_categoria = $1
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id_categoria, nombre, descripcion, estado FROM categoria WHERE id_categoria = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id_categoria, nombre, descripcion, estado FROM categoria ORDER BY id_categoria",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }
}
