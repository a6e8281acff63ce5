//! Delivery bookings
//!
//! A booking stores the amounts it was quoted at, plus a snapshot of every
//! selected service's name and unit price. Later changes to services or
//! coupons never alter a stored booking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::pricing::PricedItem;
use crate::validation::{self, ValidationResult};

/// Delivery status label. Any status may be set from any other.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Scheduled,
    Confirmed,
    InRoute,
    Delivered,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Scheduled,
        BookingStatus::Confirmed,
        BookingStatus::InRoute,
        BookingStatus::Delivered,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InRoute => "in_route",
            BookingStatus::Delivered => "delivered",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
    pub delivery_address: String,
    pub status: BookingStatus,
    pub notes: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    pub coupon_id: Option<Uuid>,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service as it was priced when the booking was quoted
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingServiceLine {
    pub booking_id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
}

impl PricedItem for BookingServiceLine {
    fn item_id(&self) -> Uuid {
        self.service_id
    }

    fn item_name(&self) -> &str {
        &self.service_name
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

/// Booking with its service lines, as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub services: Vec<BookingServiceLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingPayload {
    pub client_id: Uuid,
    pub service_ids: Vec<Uuid>,
    pub scheduled_for: DateTime<Utc>,
    pub delivery_address: String,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

impl CreateBookingPayload {
    pub fn validate(&self) -> ValidationResult {
        validation::require_selection("serviceIds", &self.service_ids)?;
        validation::require_text("deliveryAddress", &self.delivery_address)
    }
}

/// Fields left out keep their stored value.
///
/// `serviceIds` or `couponCode` trigger a new quote; an empty `couponCode`
/// removes the coupon. Without either, stored amounts are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingPayload {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub service_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

impl UpdateBookingPayload {
    pub fn validate(&self) -> ValidationResult {
        if let Some(ids) = &self.service_ids {
            validation::require_selection("serviceIds", ids)?;
        }
        if let Some(address) = &self.delivery_address {
            validation::require_text("deliveryAddress", address)?;
        }
        Ok(())
    }

    pub fn requires_requote(&self) -> bool {
        self.service_ids.is_some() || self.coupon_code.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingStatusPayload {
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        for status in BookingStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        let parsed: BookingStatus = serde_json::from_str("\"in_route\"").unwrap();
        assert_eq!(parsed, BookingStatus::InRoute);
    }

    #[test]
    fn test_create_payload_defaults() {
        let payload: CreateBookingPayload = serde_json::from_value(serde_json::json!({
            "clientId": Uuid::new_v4(),
            "serviceIds": [Uuid::new_v4()],
            "scheduledFor": "2026-03-01T10:00:00Z",
            "deliveryAddress": "Rua das Flores, 12"
        }))
        .unwrap();

        assert_eq!(payload.status, BookingStatus::Scheduled);
        assert!(payload.coupon_code.is_none());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_create_payload_requires_services() {
        let payload: CreateBookingPayload = serde_json::from_value(serde_json::json!({
            "clientId": Uuid::new_v4(),
            "serviceIds": [],
            "scheduledFor": "2026-03-01T10:00:00Z",
            "deliveryAddress": "Rua das Flores, 12"
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_update_requote_detection() {
        let mut payload = UpdateBookingPayload::default();
        assert!(!payload.requires_requote());

        payload.notes = Some("ring twice".to_string());
        assert!(!payload.requires_requote());

        payload.coupon_code = Some(String::new());
        assert!(payload.requires_requote());
    }

    #[test]
    fn test_detail_flattens_booking() {
        let now = Utc::now();
        let detail = BookingDetail {
            booking: Booking {
                id: Uuid::new_v4(),
                client_id: Uuid::new_v4(),
                scheduled_for: now,
                delivery_address: "Av. Central 100".to_string(),
                status: BookingStatus::Confirmed,
                notes: None,
                subtotal: Decimal::new(15000, 2),
                coupon_id: None,
                discount_amount: Decimal::ZERO,
                final_amount: Decimal::new(15000, 2),
                created_at: now,
                updated_at: now,
            },
            services: vec![],
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["finalAmount"], "150.00");
        assert_eq!(value["status"], "confirmed");
        assert!(value["services"].as_array().unwrap().is_empty());
    }
}
