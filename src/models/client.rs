//! Client (customer) records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{self, ValidationResult};

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub neighborhood: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create and update share the same shape
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub address: String,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClientPayload {
    pub fn validate(&self) -> ValidationResult {
        validation::require_text("name", &self.name)?;
        validation::validate_phone(&self.phone)?;
        validation::require_text("address", &self.address)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validation::validate_email(email)?;
        }
        Ok(())
    }
}
