//! Deliverable services (gas cylinders, installation visits, ...)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{self, ValidationResult};

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ServicePayload {
    pub fn validate(&self) -> ValidationResult {
        validation::require_text("name", &self.name)?;
        validation::require_money("price", self.price)
    }
}

impl crate::pricing::PricedItem for Service {
    fn item_id(&self) -> Uuid {
        self.id
    }

    fn item_name(&self) -> &str {
        &self.name
    }

    fn unit_price(&self) -> Decimal {
        self.price
    }
}
