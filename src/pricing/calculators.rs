//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::DiscountType;

/// Anything that can be put on a booking and priced.
///
/// Implemented by live catalogue services and by the price snapshots stored
/// on existing bookings, so a booking can be re-quoted from either.
pub trait PricedItem {
    fn item_id(&self) -> Uuid;
    fn item_name(&self) -> &str;
    fn unit_price(&self) -> Decimal;
}

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use gasdelivery_web::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Sum of unit prices over the selected items.
///
/// Empty selection yields zero. Active flags are not consulted here; whether an
/// inactive service may be selected is decided before pricing.
pub fn compute_subtotal<T: PricedItem>(items: &[T]) -> Decimal {
    items.iter().map(|item| item.unit_price()).sum()
}

/// Discount a coupon of the given kind grants on `amount`.
///
/// Fixed discounts are returned as-is, even when larger than the amount.
///
/// Percentage discounts are rounded to cents with banker's rounding
/// ([`round_money`]), so 12.5% of 0.20 is 0.02. The rounded value is what a
/// booking stores, which keeps the database's own half-up rounding out of it.
/// A discount too large for `Decimal` is capped at `amount`, which is all it
/// can take off.
pub fn calculate_discount(
    discount_type: DiscountType,
    discount_value: Decimal,
    amount: Decimal,
) -> Decimal {
    match discount_type {
        DiscountType::Fixed => discount_value,
        DiscountType::Percentage => {
            let discount = amount
                .checked_mul(discount_value)
                .map(|product| product / Decimal::ONE_HUNDRED)
                .or_else(|| (amount / Decimal::ONE_HUNDRED).checked_mul(discount_value));

            match discount {
                Some(discount) => round_money(discount, 2),
                None => amount,
            }
        }
    }
}

/// Amount payable after discount, never below zero
pub fn final_amount(amount: Decimal, discount_amount: Decimal) -> Decimal {
    (amount - discount_amount).max(Decimal::ZERO)
}
