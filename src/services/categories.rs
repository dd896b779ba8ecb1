use std::sync::Arc;

use crate::domain::{Category, CategoryChanges, DomainError, DomainResult, NewCategory};
use crate::repository::CategoryRepository;

const CATEGORY_NOT_FOUND: &str = "No encontrada";

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn create(&self, category: NewCategory) -> DomainResult<i32> {
        let id = self.categories.create(category).await?;
        tracing::info!(category_id = id, "Category created");
        Ok(id)
    }

    pub async fn update(&self, id: i32, changes: CategoryChanges) -> DomainResult<bool> {
        if self.categories.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(CATEGORY_NOT_FOUND));
        }
        if !self.categories.update(id, changes).await? {
            return Err(DomainError::not_found(CATEGORY_NOT_FOUND));
        }
        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<bool> {
        self.update(id, CategoryChanges::deactivate()).await
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<Option<Category>> {
        Ok(self.categories.find_by_id(id).await?)
    }

    pub async fn get_all(&self) -> DomainResult<Vec<Category>> {
        Ok(self.categories.find_all().await?)
    }
}
