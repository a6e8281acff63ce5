//! Booking quotes: amounts frozen at the time a booking is created or edited.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::calculators::{compute_subtotal, final_amount, PricedItem};
use super::coupons::CouponValidation;

/// Amounts persisted on a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingAmounts {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
}

impl BookingAmounts {
    pub fn undiscounted(subtotal: Decimal) -> Self {
        Self {
            subtotal,
            discount_amount: Decimal::ZERO,
            final_amount: subtotal,
        }
    }
}

/// Combine the selection's subtotal with an optional coupon validation.
///
/// Only a valid coupon contributes a discount; an invalid one (or none) leaves
/// the final amount equal to the subtotal.
pub fn compose_booking_amounts<T: PricedItem>(
    items: &[T],
    validation: Option<&CouponValidation>,
) -> BookingAmounts {
    let subtotal = compute_subtotal(items);

    match validation {
        Some(v) if v.is_valid() => {
            let discount_amount = v.discount_amount();
            BookingAmounts {
                subtotal,
                discount_amount,
                final_amount: final_amount(subtotal, discount_amount),
            }
        }
        _ => BookingAmounts::undiscounted(subtotal),
    }
}

/// A priced line as it will be stored on the booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteLine {
    pub service_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
}

/// Snapshot of what the customer is charged
#[derive(Debug, Clone)]
pub struct BookingQuote {
    pub lines: Vec<QuoteLine>,
    pub amounts: BookingAmounts,
    pub coupon_id: Option<Uuid>,
    pub coupon_code: Option<String>,
    pub quoted_at: DateTime<Utc>,
}

impl BookingQuote {
    pub fn new<T: PricedItem>(
        items: &[T],
        validation: Option<&CouponValidation>,
        quoted_at: DateTime<Utc>,
    ) -> Self {
        let lines = items
            .iter()
            .map(|item| QuoteLine {
                service_id: item.item_id(),
                name: item.item_name().to_string(),
                unit_price: item.unit_price(),
            })
            .collect();

        let coupon = validation.and_then(|v| v.coupon());

        Self {
            lines,
            amounts: compose_booking_amounts(items, validation),
            coupon_id: coupon.map(|c| c.id),
            coupon_code: coupon.map(|c| c.code.clone()),
            quoted_at,
        }
    }

    pub fn service_ids(&self) -> Vec<Uuid> {
        self.lines.iter().map(|line| line.service_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscountType;
    use crate::pricing::coupons::tests::coupon;
    use crate::pricing::coupons::{validate_coupon, CouponRejection};
    use rust_decimal_macros::dec;

    struct Svc {
        id: Uuid,
        name: &'static str,
        price: Decimal,
    }

    impl PricedItem for Svc {
        fn item_id(&self) -> Uuid {
            self.id
        }

        fn item_name(&self) -> &str {
            self.name
        }

        fn unit_price(&self) -> Decimal {
            self.price
        }
    }

    fn svc(name: &'static str, price: Decimal) -> Svc {
        Svc {
            id: Uuid::new_v4(),
            name,
            price,
        }
    }

    #[test]
    fn test_fixed_coupon_scenario() {
        let services = vec![svc("P13 cylinder", dec!(100)), svc("Delivery", dec!(50))];
        let c = coupon(DiscountType::Fixed, dec!(30));
        let validation = validate_coupon(Some(&c), compute_subtotal(&services), Utc::now());

        let amounts = compose_booking_amounts(&services, Some(&validation));
        assert_eq!(amounts.subtotal, dec!(150));
        assert_eq!(amounts.discount_amount, dec!(30));
        assert_eq!(amounts.final_amount, dec!(120));
    }

    #[test]
    fn test_percentage_coupon_scenario() {
        let services = vec![svc("P45 cylinder", dec!(200))];
        let c = coupon(DiscountType::Percentage, dec!(10));
        let validation = validate_coupon(Some(&c), dec!(200), Utc::now());

        let amounts = compose_booking_amounts(&services, Some(&validation));
        assert_eq!(amounts.discount_amount, dec!(20));
        assert_eq!(amounts.final_amount, dec!(180));
    }

    #[test]
    fn test_unknown_coupon_proceeds_without_discount() {
        let services = vec![svc("P13 cylinder", dec!(110))];
        let validation = CouponValidation::Invalid(CouponRejection::NotFound);

        let amounts = compose_booking_amounts(&services, Some(&validation));
        assert_eq!(amounts, BookingAmounts::undiscounted(dec!(110)));
    }

    #[test]
    fn test_no_coupon() {
        let services = vec![svc("P13 cylinder", dec!(110)), svc("Install", dec!(40))];
        let amounts = compose_booking_amounts(&services, None);
        assert_eq!(amounts.subtotal, dec!(150));
        assert_eq!(amounts.discount_amount, dec!(0));
        assert_eq!(amounts.final_amount, dec!(150));
    }

    #[test]
    fn test_final_never_negative() {
        let services = vec![svc("Refill", dec!(20))];
        let c = coupon(DiscountType::Fixed, dec!(50));
        let validation = validate_coupon(Some(&c), dec!(20), Utc::now());

        let amounts = compose_booking_amounts(&services, Some(&validation));
        assert_eq!(amounts.discount_amount, dec!(50));
        assert_eq!(amounts.final_amount, dec!(0));
    }

    #[test]
    fn test_quote_snapshots_lines_and_coupon() {
        let services = vec![svc("P13 cylinder", dec!(100)), svc("Delivery", dec!(50))];
        let c = coupon(DiscountType::Fixed, dec!(30));
        let validation = validate_coupon(Some(&c), dec!(150), Utc::now());
        let now = Utc::now();

        let quote = BookingQuote::new(&services, Some(&validation), now);

        assert_eq!(quote.lines.len(), 2);
        assert_eq!(quote.lines[0].name, "P13 cylinder");
        assert_eq!(quote.lines[1].unit_price, dec!(50));
        assert_eq!(quote.service_ids(), vec![services[0].id, services[1].id]);
        assert_eq!(quote.coupon_id, Some(c.id));
        assert_eq!(quote.coupon_code.as_deref(), Some("WELCOME"));
        assert_eq!(quote.amounts.final_amount, dec!(120));
        assert_eq!(quote.quoted_at, now);
    }

    #[test]
    fn test_quote_without_valid_coupon_has_no_coupon_id() {
        let services = vec![svc("P13 cylinder", dec!(100))];
        let mut c = coupon(DiscountType::Fixed, dec!(30));
        c.is_active = false;
        let validation = validate_coupon(Some(&c), dec!(100), Utc::now());

        let quote = BookingQuote::new(&services, Some(&validation), Utc::now());
        assert!(quote.coupon_id.is_none());
        assert_eq!(quote.amounts.final_amount, dec!(100));
    }
}
