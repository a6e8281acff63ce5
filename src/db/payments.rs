//! Payment queries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CreatePaymentPayload, Payment, PaymentStatus, UpdatePaymentPayload};

const PAYMENT_COLUMNS: &str = r#"
    id, booking_id, amount, method, status, paid_at, notes, created_at, updated_at
"#;

pub async fn list(
    pool: &PgPool,
    booking_id: Option<Uuid>,
    status: Option<PaymentStatus>,
) -> Result<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        r#"
        SELECT {}
        FROM payments
        WHERE ($1::uuid IS NULL OR booking_id = $1)
          AND ($2::payment_status IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
        PAYMENT_COLUMNS
    ))
    .bind(booking_id)
    .bind(status)
    .fetch_all(pool)
    .await?;

    Ok(payments)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(&format!(
        "SELECT {} FROM payments WHERE id = $1",
        PAYMENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn create(
    pool: &PgPool,
    payload: &CreatePaymentPayload,
    paid_at: Option<DateTime<Utc>>,
) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        r#"
        INSERT INTO payments (booking_id, amount, method, status, paid_at, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        PAYMENT_COLUMNS
    ))
    .bind(payload.booking_id)
    .bind(payload.amount)
    .bind(payload.method)
    .bind(payload.status)
    .bind(paid_at)
    .bind(payload.notes.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(payment)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    payload: &UpdatePaymentPayload,
    paid_at: Option<DateTime<Utc>>,
) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(&format!(
        r#"
        UPDATE payments
        SET amount = $2, method = $3, status = $4, paid_at = $5, notes = $6, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        PAYMENT_COLUMNS
    ))
    .bind(id)
    .bind(payload.amount)
    .bind(payload.method)
    .bind(payload.status)
    .bind(paid_at)
    .bind(payload.notes.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn set_status(
    pool: &PgPool,
    id: Uuid,
    status: PaymentStatus,
    paid_at: Option<DateTime<Utc>>,
) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(&format!(
        r#"
        UPDATE payments
        SET status = $2, paid_at = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        PAYMENT_COLUMNS
    ))
    .bind(id)
    .bind(status)
    .bind(paid_at)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Sum of payment amounts with the given status
pub async fn total_by_status(pool: &PgPool, status: PaymentStatus) -> Result<Decimal> {
    let total: Decimal = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM payments
        WHERE status = $1
        "#,
    )
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(total)
}
