//! Client queries

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Client, ClientPayload};

/// List clients, optionally filtered by a name/phone fragment
pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, phone, email, address, neighborhood, notes, created_at, updated_at
        FROM clients
        WHERE $1::text IS NULL
           OR name ILIKE '%' || $1 || '%'
           OR phone ILIKE '%' || $1 || '%'
        ORDER BY name
        "#,
    )
    .bind(search)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Client> {
    sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, phone, email, address, neighborhood, notes, created_at, updated_at
        FROM clients
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn create(pool: &PgPool, payload: &ClientPayload) -> Result<Client> {
    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (name, phone, email, address, neighborhood, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, phone, email, address, neighborhood, notes, created_at, updated_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.phone.trim())
    .bind(payload.email.as_deref())
    .bind(payload.address.trim())
    .bind(payload.neighborhood.as_deref())
    .bind(payload.notes.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(client)
}

pub async fn update(pool: &PgPool, id: Uuid, payload: &ClientPayload) -> Result<Client> {
    sqlx::query_as::<_, Client>(
        r#"
        UPDATE clients
        SET name = $2, phone = $3, email = $4, address = $5,
            neighborhood = $6, notes = $7, updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, phone, email, address, neighborhood, notes, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(payload.name.trim())
    .bind(payload.phone.trim())
    .bind(payload.email.as_deref())
    .bind(payload.address.trim())
    .bind(payload.neighborhood.as_deref())
    .bind(payload.notes.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Clients with bookings cannot be deleted (foreign key -> 409)
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

pub async fn count(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
