//! Discount coupons

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{self, ValidationResult};

/// How `discount_value` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "discount_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the amount (0-100 by convention)
    Percentage,
    /// `discount_value` is subtracted as-is
    Fixed,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_value: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub minimum_amount: Option<Decimal>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_usage: Option<i32>,
    pub max_usage_per_user: Option<i32>,
    pub current_usage: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponPayload {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub minimum_amount: Option<Decimal>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_usage: Option<i32>,
    #[serde(default)]
    pub max_usage_per_user: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CouponPayload {
    /// Percentages above 100 are accepted; the final amount is clamped at zero.
    pub fn validate(&self) -> ValidationResult {
        validation::require_text("code", &self.code)?;
        validation::require_money("discountValue", self.discount_value)?;
        if let Some(minimum) = self.minimum_amount {
            validation::require_money("minimumAmount", minimum)?;
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if from > until {
                return Err("validFrom must not be after validUntil".into());
            }
        }
        for (field, cap) in [
            ("maxUsage", self.max_usage),
            ("maxUsagePerUser", self.max_usage_per_user),
        ] {
            if matches!(cap, Some(c) if c < 0) {
                return Err(format!("{} must not be negative", field));
            }
        }
        Ok(())
    }
}
