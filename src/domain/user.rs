//! User accounts (`usuarios`)

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::status;
use super::time::serialize_bogota;

/// A registered entity: an individual or an organization
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    #[serde(rename = "tipoEntidad")]
    pub entity_type: String,
    #[serde(rename = "nombreEntidad")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(rename = "estado")]
    pub status: i32,
    #[serde(rename = "fechaRegistro", serialize_with = "serialize_bogota")]
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Administrator sentinel check used by the credential fallback
    pub fn is_admin(&self) -> bool {
        self.status == status::ADMINISTRATOR
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            entity_type: self.entity_type.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
        }
    }
}

/// Public projection of a user embedded in joined reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: i32,
    #[serde(rename = "tipoEntidad")]
    pub entity_type: String,
    #[serde(rename = "nombreEntidad")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "ubicacion")]
    pub location: String,
}

/// A user ready to be persisted; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub entity_type: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub address: String,
    pub password_hash: String,
    pub status: i32,
    pub registered_at: DateTime<Utc>,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub entity_type: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub password_hash: Option<String>,
    pub status: Option<i32>,
}

impl UserChanges {
    /// Soft delete
    pub fn deactivate() -> Self {
        Self {
            status: Some(status::INACTIVE),
            ..Self::default()
        }
    }

    pub fn password(password_hash: String) -> Self {
        Self {
            password_hash: Some(password_hash),
            ..Self::default()
        }
    }

    /// Apply the present fields onto a stored user
    pub fn apply_to(self, user: &mut User) {
        if let Some(entity_type) = self.entity_type {
            user.entity_type = entity_type;
        }
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(location) = self.location {
            user.location = location;
        }
        if let Some(address) = self.address {
            user.address = address;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
    }
}
