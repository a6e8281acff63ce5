//! Service catalogue queries

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Service, ServicePayload};

pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Service>> {
    let services = sqlx::query_as::<_, Service>(
        r#"
        SELECT id, name, description, price, is_active, created_at, updated_at
        FROM services
        WHERE NOT $1 OR is_active
        ORDER BY name
        "#,
    )
    .bind(active_only)
    .fetch_all(pool)
    .await?;

    Ok(services)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Service> {
    sqlx::query_as::<_, Service>(
        r#"
        SELECT id, name, description, price, is_active, created_at, updated_at
        FROM services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Fetch several services at once; unknown ids are simply absent
pub async fn get_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Service>> {
    let services = sqlx::query_as::<_, Service>(
        r#"
        SELECT id, name, description, price, is_active, created_at, updated_at
        FROM services
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(services)
}

pub async fn create(pool: &PgPool, payload: &ServicePayload) -> Result<Service> {
    let service = sqlx::query_as::<_, Service>(
        r#"
        INSERT INTO services (name, description, price, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, description, price, is_active, created_at, updated_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.description.as_deref())
    .bind(payload.price)
    .bind(payload.is_active)
    .fetch_one(pool)
    .await?;

    Ok(service)
}

pub async fn update(pool: &PgPool, id: Uuid, payload: &ServicePayload) -> Result<Service> {
    sqlx::query_as::<_, Service>(
        r#"
        UPDATE services
        SET name = $2, description = $3, price = $4, is_active = $5, updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, description, price, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(payload.name.trim())
    .bind(payload.description.as_deref())
    .bind(payload.price)
    .bind(payload.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM services WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

pub async fn count_active(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE is_active")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
