//! Which coupon uses a booking write has to count, give back or re-check.

use uuid::Uuid;

/// Coupon and client a booking carries, before or after a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouponHolder {
    pub coupon_id: Option<Uuid>,
    pub client_id: Uuid,
}

/// Usage bookkeeping for one booking write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedemptionPlan {
    /// Coupon to redeem for the booking's client (both caps, one use counted)
    pub redeem: Option<Uuid>,
    /// Coupon whose use is given back
    pub release: Option<Uuid>,
    /// Coupon kept by a booking that moved to another client: only the
    /// per-client cap is checked, the total is already counted
    pub recheck: Option<Uuid>,
}

impl RedemptionPlan {
    pub fn is_empty(&self) -> bool {
        self.redeem.is_none() && self.release.is_none() && self.recheck.is_none()
    }
}

/// Plan the usage changes between `before` (None for a new booking) and
/// `after` (None for a deleted one).
pub fn plan_redemption(before: Option<CouponHolder>, after: Option<CouponHolder>) -> RedemptionPlan {
    let previous = before.and_then(|b| b.coupon_id);
    let next = after.and_then(|a| a.coupon_id);

    if previous != next {
        return RedemptionPlan {
            redeem: next,
            release: previous,
            recheck: None,
        };
    }

    match (before, after) {
        (Some(b), Some(a)) if b.client_id != a.client_id => RedemptionPlan {
            recheck: next,
            ..RedemptionPlan::default()
        },
        _ => RedemptionPlan::default(),
    }
}
