//! Command definitions
//!
//! Normalized user input handed from the HTTP layer to the services.
//! Passwords are still plaintext here; the user service hashes them.

// =========================================================================
// RegisterUserCommand
// =========================================================================

/// Create a new account
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterUserCommand {
    pub entity_type: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub location: String,
    pub address: String,
}

impl RegisterUserCommand {
    pub fn new(name: String, email: String, password: String) -> Self {
        Self {
            entity_type: "Individual".to_string(),
            name,
            email,
            password,
            phone: String::new(),
            location: String::new(),
            address: String::new(),
        }
    }

    pub fn with_entity_type(mut self, entity_type: String) -> Self {
        self.entity_type = entity_type;
        self
    }

    pub fn with_phone(mut self, phone: String) -> Self {
        self.phone = phone;
        self
    }

    pub fn with_location(mut self, location: String) -> Self {
        self.location = location;
        self
    }

    pub fn with_address(mut self, address: String) -> Self {
        self.address = address;
        self
    }
}

// =========================================================================
// UpdateUserCommand
// =========================================================================

/// Partial account update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUserCommand {
    pub entity_type: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Re-hashed before storage
    pub password: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
}

impl UpdateUserCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn with_password(mut self, password: String) -> Self {
        self.password = Some(password);
        self
    }
}
