//! Coupon queries, including usage redemption

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Coupon, CouponPayload};

const COUPON_COLUMNS: &str = r#"
    id, code, description, discount_type, discount_value, minimum_amount,
    valid_from, valid_until, max_usage, max_usage_per_user, current_usage,
    is_active, created_at, updated_at
"#;

pub async fn list(pool: &PgPool) -> Result<Vec<Coupon>> {
    let coupons = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {} FROM coupons ORDER BY created_at DESC",
        COUPON_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(coupons)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Coupon> {
    sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {} FROM coupons WHERE id = $1",
        COUPON_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Exact, case-sensitive code lookup.
///
/// Callers pass the code with surrounding whitespace trimmed; codes are
/// trimmed the same way when a coupon is written, so the two forms match.
pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Coupon>> {
    let coupon = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {} FROM coupons WHERE code = $1",
        COUPON_COLUMNS
    ))
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(coupon)
}

pub async fn create(pool: &PgPool, payload: &CouponPayload) -> Result<Coupon> {
    let coupon = sqlx::query_as::<_, Coupon>(&format!(
        r#"
        INSERT INTO coupons (
            code, description, discount_type, discount_value, minimum_amount,
            valid_from, valid_until, max_usage, max_usage_per_user, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {}
        "#,
        COUPON_COLUMNS
    ))
    .bind(payload.code.trim())
    .bind(payload.description.as_deref())
    .bind(payload.discount_type)
    .bind(payload.discount_value)
    .bind(payload.minimum_amount)
    .bind(payload.valid_from)
    .bind(payload.valid_until)
    .bind(payload.max_usage)
    .bind(payload.max_usage_per_user)
    .bind(payload.is_active)
    .fetch_one(pool)
    .await?;

    Ok(coupon)
}

/// Updates the definition; `current_usage` is only changed by redemption
pub async fn update(pool: &PgPool, id: Uuid, payload: &CouponPayload) -> Result<Coupon> {
    sqlx::query_as::<_, Coupon>(&format!(
        r#"
        UPDATE coupons
        SET code = $2, description = $3, discount_type = $4, discount_value = $5,
            minimum_amount = $6, valid_from = $7, valid_until = $8, max_usage = $9,
            max_usage_per_user = $10, is_active = $11, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        COUPON_COLUMNS
    ))
    .bind(id)
    .bind(payload.code.trim())
    .bind(payload.description.as_deref())
    .bind(payload.discount_type)
    .bind(payload.discount_value)
    .bind(payload.minimum_amount)
    .bind(payload.valid_from)
    .bind(payload.valid_until)
    .bind(payload.max_usage)
    .bind(payload.max_usage_per_user)
    .bind(payload.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Lock the coupon row for the rest of the transaction
pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Coupon> {
    sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {} FROM coupons WHERE id = $1 FOR UPDATE",
        COUPON_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::NotFound)
}

/// Increment usage if still under the total cap. Returns false when exhausted.
pub async fn try_increment_usage(conn: &mut PgConnection, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE coupons
        SET current_usage = current_usage + 1, updated_at = NOW()
        WHERE id = $1
          AND (max_usage IS NULL OR current_usage < max_usage)
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Give back one use, e.g. when a booking drops its coupon
pub async fn release_usage(conn: &mut PgConnection, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE coupons
        SET current_usage = GREATEST(current_usage - 1, 0), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Bookings (not cancelled) of a client that used the coupon
pub async fn count_client_redemptions(
    conn: &mut PgConnection,
    coupon_id: Uuid,
    client_id: Uuid,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM bookings
        WHERE coupon_id = $1
          AND client_id = $2
          AND status <> 'cancelled'
        "#,
    )
    .bind(coupon_id)
    .bind(client_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}
