//! Pricing service functions with database access.
//!
//! These functions fetch services and coupons, hand them to the pure
//! calculators, and redeem coupons when a booking is saved.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::db;
use crate::error::{AppError, Result};
use crate::models::{Coupon, Service};

use super::calculators::compute_subtotal;
use super::coupons::{per_user_cap_reached, total_cap_reached, validate_coupon, CouponValidation};
use super::quote::BookingQuote;
use super::redemption::RedemptionPlan;

/// Resolve selected service ids to records, cache first.
///
/// Duplicate ids are collapsed (a selection is a set) and the caller's order is
/// kept. Any id that does not exist is a bad request.
pub async fn resolve_services(
    pool: &PgPool,
    cache: &AppCache,
    ids: &[Uuid],
) -> Result<Vec<Service>> {
    let mut wanted: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !wanted.contains(id) {
            wanted.push(*id);
        }
    }

    let mut found: HashMap<Uuid, Service> = HashMap::with_capacity(wanted.len());
    let mut misses = Vec::new();

    for id in &wanted {
        match cache.services.get(id).await {
            Some(cached) => {
                found.insert(*id, (*cached).clone());
            }
            None => misses.push(*id),
        }
    }

    if !misses.is_empty() {
        debug!("Service cache MISS for {} ids", misses.len());
        for service in db::services::get_many(pool, &misses).await? {
            cache.insert_service(service.clone()).await;
            found.insert(service.id, service);
        }
    }

    wanted
        .iter()
        .map(|id| {
            found
                .remove(id)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown service id {}", id)))
        })
        .collect()
}

/// Look the code up and validate it against `amount`
pub async fn validate_coupon_code(
    pool: &PgPool,
    code: &str,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<CouponValidation> {
    let coupon = db::coupons::find_by_code(pool, code).await?;
    let validation = validate_coupon(coupon.as_ref(), amount, now);

    match validation.rejection() {
        None => debug!("Coupon {} valid for amount {}", code, amount),
        Some(rejection) => debug!(
            "Coupon {} rejected for amount {}: {}",
            code,
            amount,
            rejection.reason()
        ),
    }

    Ok(validation)
}

/// Quote a selection with an optional coupon code.
///
/// An invalid coupon does not fail the quote; it is returned alongside so the
/// caller can show why no discount was applied.
pub async fn quote_selection(
    pool: &PgPool,
    cache: &AppCache,
    service_ids: &[Uuid],
    coupon_code: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(BookingQuote, Option<CouponValidation>)> {
    let services = resolve_services(pool, cache, service_ids).await?;
    let validation = match coupon_code {
        Some(code) => Some(validate_coupon_code(pool, code, compute_subtotal(&services), now).await?),
        None => None,
    };

    Ok((BookingQuote::new(&services, validation.as_ref(), now), validation))
}

/// Count one use of a coupon for `client_id`, inside the booking transaction.
///
/// The coupon row is locked first so concurrent bookings cannot both slip
/// past a cap.
pub async fn redeem_coupon(conn: &mut PgConnection, coupon_id: Uuid, client_id: Uuid) -> Result<()> {
    let coupon = db::coupons::lock(conn, coupon_id).await?;
    check_client_cap(conn, &coupon, client_id).await?;

    if total_cap_reached(&coupon) || !db::coupons::try_increment_usage(conn, coupon_id).await? {
        warn!("Coupon {} usage limit reached", coupon.code);
        return Err(AppError::Conflict {
            code: "coupon_exhausted",
            message: format!("Coupon {} has no uses left", coupon.code),
        });
    }

    info!("Coupon {} redeemed by client {}", coupon.code, client_id);
    Ok(())
}

/// Per-client check for a coupon a booking keeps while moving to `client_id`.
/// The total counter is left alone.
pub async fn recheck_coupon(conn: &mut PgConnection, coupon_id: Uuid, client_id: Uuid) -> Result<()> {
    let coupon = db::coupons::lock(conn, coupon_id).await?;
    check_client_cap(conn, &coupon, client_id).await
}

/// Return one use of a coupon a booking no longer carries
pub async fn release_coupon(conn: &mut PgConnection, coupon_id: Uuid) -> Result<()> {
    db::coupons::release_usage(conn, coupon_id).await?;
    info!("Coupon {} usage released", coupon_id);
    Ok(())
}

/// Carry out a [`RedemptionPlan`] for a booking now held by `client_id`
pub async fn apply_redemption(
    conn: &mut PgConnection,
    plan: &RedemptionPlan,
    client_id: Uuid,
) -> Result<()> {
    if let Some(coupon_id) = plan.redeem {
        redeem_coupon(conn, coupon_id, client_id).await?;
    }
    if let Some(coupon_id) = plan.recheck {
        recheck_coupon(conn, coupon_id, client_id).await?;
    }
    if let Some(coupon_id) = plan.release {
        release_coupon(conn, coupon_id).await?;
    }
    Ok(())
}

async fn check_client_cap(conn: &mut PgConnection, coupon: &Coupon, client_id: Uuid) -> Result<()> {
    if coupon.max_usage_per_user.is_none() {
        return Ok(());
    }

    let used = db::coupons::count_client_redemptions(conn, coupon.id, client_id).await?;
    if per_user_cap_reached(coupon, used) {
        warn!("Coupon {} per-client limit reached for client {}", coupon.code, client_id);
        return Err(AppError::Conflict {
            code: "coupon_user_limit",
            message: format!("Coupon {} was already used by this client", coupon.code),
        });
    }
    Ok(())
}
