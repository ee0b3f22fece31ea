// src/models/user.rs
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{non_empty, opt_string, Record, UserRole};

// ==================== USER ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "usuario_id", alias = "id", default)]
    pub id: Option<i64>,
    #[serde(rename = "nombre", default)]
    pub first_name: String,
    #[serde(rename = "apellido", default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "numero_identificacion", default)]
    pub national_id: Option<String>,
    /// Raw role value as sent by the backend; see [`User::parsed_role`].
    #[serde(rename = "tipo_usuario", default)]
    pub role: String,
    #[serde(rename = "fecha_registro", default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// `None` when the backend sent a role outside the enumeration.
    pub fn parsed_role(&self) -> Option<UserRole> {
        UserRole::from_wire(&self.role)
    }
}

impl Record for User {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "usuario_id" | "id" => self.id.map(|id| id.to_string()),
            "nombre" => non_empty(&self.first_name),
            "apellido" => non_empty(&self.last_name),
            "email" => non_empty(&self.email),
            "numero_identificacion" => opt_string(&self.national_id),
            "tipo_usuario" => non_empty(&self.role),
            "fecha_registro" => opt_string(&self.registered_at),
            _ => None,
        }
    }
}

// ==================== AUTH FORMS ====================

#[derive(Debug, Clone, Serialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub nombre: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub apellido: String,

    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 50, message = "Identification number is required"))]
    pub numero_identificacion: String,

    pub tipo_usuario: UserRole,
}
