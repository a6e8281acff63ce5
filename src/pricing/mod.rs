//! Pricing & coupon engine for bookings.
//!
//! Pure calculations live in `calculators`, `coupons` and `quote`; `services`
//! adds the database lookups and coupon redemption around them.

pub mod calculators;
pub mod coupons;
pub mod quote;
pub mod redemption;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{calculate_discount, compute_subtotal, final_amount, round_money, PricedItem};
pub use coupons::{validate_coupon, CouponRejection, CouponValidation};
pub use quote::{compose_booking_amounts, BookingAmounts, BookingQuote, QuoteLine};
pub use redemption::{plan_redemption, CouponHolder, RedemptionPlan};
pub use routes::router;
