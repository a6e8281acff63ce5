//! Request DTOs for pricing API endpoints.
//!
//! Amounts accept JSON numbers or strings.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Request to validate a coupon code against an amount
#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub amount: Decimal,
}

/// Request to preview the amounts of a booking before saving it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub service_ids: Vec<Uuid>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// Trimmed coupon code, or `None` when blank
pub fn normalize_code(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(None), None);
        assert_eq!(normalize_code(Some("")), None);
        assert_eq!(normalize_code(Some("   ")), None);
        assert_eq!(normalize_code(Some(" GAS10 ")), Some("GAS10"));
        // case is preserved, matching is exact
        assert_eq!(normalize_code(Some("gas10")), Some("gas10"));
    }

    #[test]
    fn test_validate_request_amount_forms() {
        let numeric: ValidateCouponRequest =
            serde_json::from_str(r#"{"code":"GAS10","amount":150}"#).unwrap();
        let text: ValidateCouponRequest =
            serde_json::from_str(r#"{"code":"GAS10","amount":"150.00"}"#).unwrap();
        assert_eq!(numeric.amount, dec!(150));
        assert_eq!(text.amount, dec!(150));
    }

    #[test]
    fn test_quote_request() {
        let id = Uuid::new_v4();
        let req: QuoteRequest =
            serde_json::from_value(serde_json::json!({ "serviceIds": [id] })).unwrap();
        assert_eq!(req.service_ids, vec![id]);
        assert!(req.coupon_code.is_none());
    }
}
