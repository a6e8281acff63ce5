//! Booking queries
//!
//! Bookings are written together with their service snapshot lines inside
//! the caller's transaction.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Booking, BookingServiceLine, BookingStatus};
use crate::pricing::BookingQuote;

const BOOKING_COLUMNS: &str = r#"
    id, client_id, scheduled_for, delivery_address, status, notes,
    subtotal, coupon_id, discount_amount, final_amount, created_at, updated_at
"#;

/// Non-price fields of a booking
#[derive(Debug, Clone)]
pub struct BookingFields {
    pub client_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
    pub delivery_address: String,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

impl From<&Booking> for BookingFields {
    fn from(booking: &Booking) -> Self {
        Self {
            client_id: booking.client_id,
            scheduled_for: booking.scheduled_for,
            delivery_address: booking.delivery_address.clone(),
            status: booking.status,
            notes: booking.notes.clone(),
        }
    }
}

pub async fn list(
    pool: &PgPool,
    status: Option<BookingStatus>,
    client_id: Option<Uuid>,
) -> Result<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(&format!(
        r#"
        SELECT {}
        FROM bookings
        WHERE ($1::booking_status IS NULL OR status = $1)
          AND ($2::uuid IS NULL OR client_id = $2)
        ORDER BY scheduled_for DESC
        "#,
        BOOKING_COLUMNS
    ))
    .bind(status)
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        "SELECT {} FROM bookings WHERE id = $1",
        BOOKING_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Same as [`get`] but locks the row for the transaction
pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
        BOOKING_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn service_lines(pool: &PgPool, booking_id: Uuid) -> Result<Vec<BookingServiceLine>> {
    let lines = sqlx::query_as::<_, BookingServiceLine>(
        r#"
        SELECT booking_id, service_id, service_name, unit_price
        FROM booking_services
        WHERE booking_id = $1
        ORDER BY service_name
        "#,
    )
    .bind(booking_id)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}

pub async fn service_lines_in(
    conn: &mut PgConnection,
    booking_id: Uuid,
) -> Result<Vec<BookingServiceLine>> {
    let lines = sqlx::query_as::<_, BookingServiceLine>(
        r#"
        SELECT booking_id, service_id, service_name, unit_price
        FROM booking_services
        WHERE booking_id = $1
        ORDER BY service_name
        "#,
    )
    .bind(booking_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(lines)
}

/// Insert a booking and its price snapshot
pub async fn insert(
    conn: &mut PgConnection,
    fields: &BookingFields,
    quote: &BookingQuote,
) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(&format!(
        r#"
        INSERT INTO bookings (
            client_id, scheduled_for, delivery_address, status, notes,
            subtotal, coupon_id, discount_amount, final_amount
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        BOOKING_COLUMNS
    ))
    .bind(fields.client_id)
    .bind(fields.scheduled_for)
    .bind(fields.delivery_address.trim())
    .bind(fields.status)
    .bind(fields.notes.as_deref())
    .bind(quote.amounts.subtotal)
    .bind(quote.coupon_id)
    .bind(quote.amounts.discount_amount)
    .bind(quote.amounts.final_amount)
    .fetch_one(&mut *conn)
    .await?;

    replace_lines(conn, booking.id, quote).await?;

    Ok(booking)
}

/// Update the non-price fields and, when a new quote is given, the amounts
/// and snapshot lines as well.
pub async fn update(
    conn: &mut PgConnection,
    id: Uuid,
    fields: &BookingFields,
    quote: Option<&BookingQuote>,
) -> Result<Booking> {
    let booking = match quote {
        Some(quote) => sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET client_id = $2, scheduled_for = $3, delivery_address = $4, status = $5,
                notes = $6, subtotal = $7, coupon_id = $8, discount_amount = $9,
                final_amount = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(fields.client_id)
        .bind(fields.scheduled_for)
        .bind(fields.delivery_address.trim())
        .bind(fields.status)
        .bind(fields.notes.as_deref())
        .bind(quote.amounts.subtotal)
        .bind(quote.coupon_id)
        .bind(quote.amounts.discount_amount)
        .bind(quote.amounts.final_amount)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound)?,
        None => sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET client_id = $2, scheduled_for = $3, delivery_address = $4, status = $5,
                notes = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(fields.client_id)
        .bind(fields.scheduled_for)
        .bind(fields.delivery_address.trim())
        .bind(fields.status)
        .bind(fields.notes.as_deref())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound)?,
    };

    if let Some(quote) = quote {
        replace_lines(conn, id, quote).await?;
    }

    Ok(booking)
}

async fn replace_lines(conn: &mut PgConnection, booking_id: Uuid, quote: &BookingQuote) -> Result<()> {
    sqlx::query("DELETE FROM booking_services WHERE booking_id = $1")
        .bind(booking_id)
        .execute(&mut *conn)
        .await?;

    for line in &quote.lines {
        sqlx::query(
            r#"
            INSERT INTO booking_services (booking_id, service_id, service_name, unit_price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(booking_id)
        .bind(line.service_id)
        .bind(&line.name)
        .bind(line.unit_price)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn set_status(pool: &PgPool, id: Uuid, status: BookingStatus) -> Result<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        r#"
        UPDATE bookings
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        BOOKING_COLUMNS
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Booking counts grouped by status
pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(BookingStatus, i64)>> {
    let rows: Vec<(BookingStatus, i64)> = sqlx::query_as(
        r#"
        SELECT status, COUNT(*)
        FROM bookings
        GROUP BY status
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
