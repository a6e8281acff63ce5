//! Service catalogue route handlers
//!
//! Every write invalidates the cached copy used for quoting.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{permissions, Subject};
use crate::db;
use crate::error::{AppError, Result};
use crate::models::{Service, ServicePayload};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct ServiceListQuery {
    #[serde(default)]
    pub active: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Query(query): Query<ServiceListQuery>,
) -> Result<Json<Vec<Service>>> {
    state.authorizer.require(&subject, permissions::SERVICES_READ)?;
    Ok(Json(db::services::list(&state.db, query.active).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>> {
    state.authorizer.require(&subject, permissions::SERVICES_READ)?;
    Ok(Json(db::services::get(&state.db, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(payload): Json<ServicePayload>,
) -> Result<(StatusCode, Json<Service>)> {
    state.authorizer.require(&subject, permissions::SERVICES_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;

    let service = db::services::create(&state.db, &payload).await?;
    info!("Service {} ({}) created", service.id, service.name);

    Ok((StatusCode::CREATED, Json(service)))
}

/// Price changes only affect bookings quoted afterwards
pub async fn update(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServicePayload>,
) -> Result<Json<Service>> {
    state.authorizer.require(&subject, permissions::SERVICES_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;

    let service = db::services::update(&state.db, id, &payload).await?;
    state.cache.invalidate_service(id).await;

    Ok(Json(service))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.authorizer.require(&subject, permissions::SERVICES_WRITE)?;

    db::services::delete(&state.db, id).await?;
    state.cache.invalidate_service(id).await;
    info!("Service {} deleted by {}", id, subject.user_id);

    Ok(StatusCode::NO_CONTENT)
}
