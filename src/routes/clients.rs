//! Client route handlers

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
use crate::models::{Client, ClientPayload};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(remove))
}

/// Query parameters for client listing
#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    #[serde(default)]
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<Vec<Client>>> {
    state.authorizer.require(&subject, permissions::CLIENTS_READ)?;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    Ok(Json(db::clients::list(&state.db, search).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<Json<Client>> {
    state.authorizer.require(&subject, permissions::CLIENTS_READ)?;
    Ok(Json(db::clients::get(&state.db, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(payload): Json<ClientPayload>,
) -> Result<(StatusCode, Json<Client>)> {
    state.authorizer.require(&subject, permissions::CLIENTS_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;

    let client = db::clients::create(&state.db, &payload).await?;
    info!("Client {} created by {}", client.id, subject.user_id);

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<Client>> {
    state.authorizer.require(&subject, permissions::CLIENTS_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;

    Ok(Json(db::clients::update(&state.db, id, &payload).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.authorizer.require(&subject, permissions::CLIENTS_WRITE)?;

    db::clients::delete(&state.db, id).await?;
    info!("Client {} deleted by {}", id, subject.user_id);

    Ok(StatusCode::NO_CONTENT)
}
