//! Payments recorded against bookings

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{self, ValidationResult};

/// Payment status label. Any status may be set from any other.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Pix,
    CreditCard,
    DebitCard,
    BankTransfer,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentPayload {
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreatePaymentPayload {
    pub fn validate(&self) -> ValidationResult {
        validation::require_money("amount", self.amount)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentPayload {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdatePaymentPayload {
    pub fn validate(&self) -> ValidationResult {
        validation::require_money("amount", self.amount)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusPayload {
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Paid payments without an explicit timestamp are stamped with `now`.
pub fn resolve_paid_at(
    status: PaymentStatus,
    paid_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (status, paid_at) {
        (_, Some(at)) => Some(at),
        (PaymentStatus::Paid, None) => Some(now),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_resolve_paid_at_stamps_paid() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(resolve_paid_at(PaymentStatus::Paid, None, now), Some(now));
    }

    #[test]
    fn test_resolve_paid_at_keeps_explicit() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2026, 4, 30, 9, 0, 0).unwrap();
        assert_eq!(
            resolve_paid_at(PaymentStatus::Paid, Some(earlier), now),
            Some(earlier)
        );
        assert_eq!(
            resolve_paid_at(PaymentStatus::Refunded, Some(earlier), now),
            Some(earlier)
        );
    }

    #[test]
    fn test_resolve_paid_at_pending() {
        let now = Utc::now();
        assert_eq!(resolve_paid_at(PaymentStatus::Pending, None, now), None);
    }

    #[test]
    fn test_payload_rejects_negative_amount() {
        let payload = CreatePaymentPayload {
            booking_id: Uuid::new_v4(),
            amount: dec!(-1),
            method: PaymentMethod::Pix,
            status: PaymentStatus::Pending,
            paid_at: None,
            notes: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_method_wire_names() {
        let parsed: PaymentMethod = serde_json::from_str("\"credit_card\"").unwrap();
        assert_eq!(parsed, PaymentMethod::CreditCard);
    }

    #[test]
    fn test_amount_accepts_number_or_string() {
        let from_number: UpdatePaymentPayload = serde_json::from_value(serde_json::json!({
            "amount": 120.5, "method": "cash", "status": "paid"
        }))
        .unwrap();
        let from_string: UpdatePaymentPayload = serde_json::from_value(serde_json::json!({
            "amount": "120.50", "method": "cash", "status": "paid"
        }))
        .unwrap();
        assert_eq!(from_number.amount, from_string.amount);
    }
}
