//! Publications (`publicacion`): goods offered for donation or sale

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::status;
use super::{Category, UserSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Publication {
    pub id: i32,
    #[serde(rename = "usuarioId")]
    pub owner_id: i32,
    #[serde(rename = "categoriaId")]
    pub category_id: i32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "cantidad")]
    pub quantity: String,
    #[serde(rename = "precio", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "fechaCaducidad")]
    pub expires_on: NaiveDate,
    #[serde(rename = "estado")]
    pub status: i32,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fechaActualizacion")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "usuario", skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
    #[serde(rename = "categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Publication {
    /// Only active publications can take part in a new transaction
    pub fn is_available(&self) -> bool {
        self.status == status::ACTIVE
    }

    pub fn summary(&self) -> PublicationSummary {
        PublicationSummary {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title.clone(),
            status: self.status,
        }
    }
}

/// Compact view embedded in report reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationSummary {
    pub id: i32,
    #[serde(rename = "usuarioId")]
    pub owner_id: i32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "estado")]
    pub status: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPublication {
    pub owner_id: i32,
    pub category_id: i32,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub quantity: String,
    pub price: Decimal,
    pub expires_on: NaiveDate,
    pub status: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublicationChanges {
    pub owner_id: Option<i32>,
    pub category_id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<Decimal>,
    pub expires_on: Option<NaiveDate>,
    pub status: Option<i32>,
}

impl PublicationChanges {
    /// Pause visibility; used both for soft delete and after a transaction
    pub fn pause() -> Self {
        Self {
            status: Some(status::INACTIVE),
            ..Self::default()
        }
    }

    pub fn apply_to(self, publication: &mut Publication) {
        if let Some(owner_id) = self.owner_id {
            publication.owner_id = owner_id;
        }
        if let Some(category_id) = self.category_id {
            publication.category_id = category_id;
        }
        if let Some(title) = self.title {
            publication.title = title;
        }
        if let Some(description) = self.description {
            publication.description = description;
        }
        if let Some(kind) = self.kind {
            publication.kind = kind;
        }
        if let Some(quantity) = self.quantity {
            publication.quantity = quantity;
        }
        if let Some(price) = self.price {
            publication.price = price;
        }
        if let Some(expires_on) = self.expires_on {
            publication.expires_on = expires_on;
        }
        if let Some(status) = self.status {
            publication.status = status;
        }
    }
}
