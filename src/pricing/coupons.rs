//! Coupon validation.
//!
//! Every failure is a normal return value carrying a reason code; callers
//! branch on [`CouponValidation::is_valid`]. Usage caps are not part of
//! validation and are enforced when a booking redeems the coupon.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::Coupon;

use super::calculators::{calculate_discount, final_amount};

/// Why a coupon cannot be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
    NotFound,
    Inactive,
    NotYetActive,
    Expired,
    BelowMinimum { minimum_amount: Decimal },
}

impl CouponRejection {
    /// Stable reason code sent to the dashboard
    pub fn reason(&self) -> &'static str {
        match self {
            CouponRejection::NotFound => "not_found",
            CouponRejection::Inactive => "inactive",
            CouponRejection::NotYetActive => "not_yet_active",
            CouponRejection::Expired => "expired",
            CouponRejection::BelowMinimum { .. } => "below_minimum",
        }
    }

    pub fn message(&self) -> String {
        match self {
            CouponRejection::NotFound => "Coupon not found".to_string(),
            CouponRejection::Inactive => "Coupon is not active".to_string(),
            CouponRejection::NotYetActive => "Coupon is not valid yet".to_string(),
            CouponRejection::Expired => "Coupon has expired".to_string(),
            CouponRejection::BelowMinimum { minimum_amount } => {
                format!("Minimum amount for this coupon is {}", minimum_amount)
            }
        }
    }
}

/// Outcome of validating a coupon against an amount
#[derive(Debug, Clone)]
pub enum CouponValidation {
    Valid {
        coupon: Coupon,
        discount_amount: Decimal,
        final_amount: Decimal,
    },
    Invalid(CouponRejection),
}

impl CouponValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, CouponValidation::Valid { .. })
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        match self {
            CouponValidation::Valid { coupon, .. } => Some(coupon),
            CouponValidation::Invalid(_) => None,
        }
    }

    /// Zero for invalid coupons
    pub fn discount_amount(&self) -> Decimal {
        match self {
            CouponValidation::Valid {
                discount_amount, ..
            } => *discount_amount,
            CouponValidation::Invalid(_) => Decimal::ZERO,
        }
    }

    pub fn rejection(&self) -> Option<CouponRejection> {
        match self {
            CouponValidation::Valid { .. } => None,
            CouponValidation::Invalid(rejection) => Some(*rejection),
        }
    }
}

/// Validate a coupon for `amount` at time `now`.
///
/// `None` means the code did not match any coupon. Checks run in a fixed
/// order and the first failing one is reported:
/// active flag, start of window, end of window (inclusive), minimum amount.
pub fn validate_coupon(
    coupon: Option<&Coupon>,
    amount: Decimal,
    now: DateTime<Utc>,
) -> CouponValidation {
    let coupon = match coupon {
        Some(c) => c,
        None => return CouponValidation::Invalid(CouponRejection::NotFound),
    };

    if !coupon.is_active {
        return CouponValidation::Invalid(CouponRejection::Inactive);
    }

    if matches!(coupon.valid_from, Some(from) if now < from) {
        return CouponValidation::Invalid(CouponRejection::NotYetActive);
    }

    if matches!(coupon.valid_until, Some(until) if now > until) {
        return CouponValidation::Invalid(CouponRejection::Expired);
    }

    if let Some(minimum_amount) = coupon.minimum_amount {
        if amount < minimum_amount {
            return CouponValidation::Invalid(CouponRejection::BelowMinimum { minimum_amount });
        }
    }

    let discount_amount =
        calculate_discount(coupon.discount_type, coupon.discount_value, amount);

    CouponValidation::Valid {
        coupon: coupon.clone(),
        discount_amount,
        final_amount: final_amount(amount, discount_amount),
    }
}

/// Whether a client already used a coupon as often as it allows
pub fn per_user_cap_reached(coupon: &Coupon, client_redemptions: i64) -> bool {
    matches!(coupon.max_usage_per_user, Some(limit) if client_redemptions >= i64::from(limit))
}

/// Whether the coupon's total usage cap is used up
pub fn total_cap_reached(coupon: &Coupon) -> bool {
    matches!(coupon.max_usage, Some(limit) if coupon.current_usage >= limit)
}
