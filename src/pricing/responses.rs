//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::Coupon;

use super::coupons::CouponValidation;
use super::quote::{BookingQuote, QuoteLine};

/// Coupon validation payload returned to the dashboard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidationResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Coupon>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    pub discount_amount: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    pub final_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    pub minimum_amount: Option<Decimal>,
}

impl From<&CouponValidation> for CouponValidationResponse {
    fn from(validation: &CouponValidation) -> Self {
        match validation {
            CouponValidation::Valid {
                coupon,
                discount_amount,
                final_amount,
            } => Self {
                is_valid: true,
                coupon: Some(coupon.clone()),
                discount_amount: Some(*discount_amount),
                final_amount: Some(*final_amount),
                reason: None,
                message: None,
                minimum_amount: None,
            },
            CouponValidation::Invalid(rejection) => Self {
                is_valid: false,
                coupon: None,
                discount_amount: None,
                final_amount: None,
                reason: Some(rejection.reason()),
                message: Some(rejection.message()),
                minimum_amount: match rejection {
                    super::coupons::CouponRejection::BelowMinimum { minimum_amount } => {
                        Some(*minimum_amount)
                    }
                    _ => None,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLineResponse {
    pub service_id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
}

impl From<&QuoteLine> for QuoteLineResponse {
    fn from(line: &QuoteLine) -> Self {
        Self {
            service_id: line.service_id,
            name: line.name.clone(),
            unit_price: line.unit_price,
        }
    }
}

/// Booking amount preview
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub lines: Vec<QuoteLineResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_amount: Decimal,
    pub coupon_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CouponValidationResponse>,
}

impl QuoteResponse {
    pub fn new(quote: &BookingQuote, validation: Option<&CouponValidation>) -> Self {
        Self {
            lines: quote.lines.iter().map(QuoteLineResponse::from).collect(),
            subtotal: quote.amounts.subtotal,
            discount_amount: quote.amounts.discount_amount,
            final_amount: quote.amounts.final_amount,
            coupon_id: quote.coupon_id,
            coupon: validation.map(CouponValidationResponse::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscountType;
    use crate::pricing::coupons::tests::coupon;
    use crate::pricing::coupons::{validate_coupon, CouponRejection};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_payload_shape() {
        let c = coupon(DiscountType::Fixed, dec!(30));
        let validation = validate_coupon(Some(&c), dec!(150), Utc::now());
        let json = serde_json::to_value(CouponValidationResponse::from(&validation)).unwrap();

        assert_eq!(json["isValid"], true);
        assert_eq!(json["discountAmount"], "30");
        assert_eq!(json["finalAmount"], "120");
        assert_eq!(json["coupon"]["code"], "WELCOME");
        assert!(json.get("reason").is_none());
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_not_found_payload_shape() {
        let validation = CouponValidation::Invalid(CouponRejection::NotFound);
        let json = serde_json::to_value(CouponValidationResponse::from(&validation)).unwrap();

        assert_eq!(json["isValid"], false);
        assert_eq!(json["reason"], "not_found");
        assert!(json.get("coupon").is_none());
        assert!(json.get("discountAmount").is_none());
        assert!(json.get("minimumAmount").is_none());
    }

    #[test]
    fn test_below_minimum_carries_minimum() {
        let validation = CouponValidation::Invalid(CouponRejection::BelowMinimum {
            minimum_amount: dec!(100.00),
        });
        let json = serde_json::to_value(CouponValidationResponse::from(&validation)).unwrap();

        assert_eq!(json["reason"], "below_minimum");
        assert_eq!(json["minimumAmount"], "100.00");
    }
}
