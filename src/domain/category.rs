//! Categories (`categoria`)

use serde::Serialize;

use super::status;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: i32,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "estado")]
    pub status: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub status: i32,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: status::ACTIVE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<i32>,
}

impl CategoryChanges {
    pub fn deactivate() -> Self {
        Self {
            status: Some(status::INACTIVE),
            ..Self::default()
        }
    }

    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(description) = self.description {
            category.description = description;
        }
        if let Some(status) = self.status {
            category.status = status;
        }
    }
}
