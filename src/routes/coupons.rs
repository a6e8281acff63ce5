//! Coupon route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::{permissions, Subject};
use crate::db;
use crate::error::{AppError, Result};
use crate::models::{Coupon, CouponPayload};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(remove))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
) -> Result<Json<Vec<Coupon>>> {
    state.authorizer.require(&subject, permissions::COUPONS_READ)?;
    Ok(Json(db::coupons::list(&state.db).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<Json<Coupon>> {
    state.authorizer.require(&subject, permissions::COUPONS_READ)?;
    Ok(Json(db::coupons::get(&state.db, id).await?))
}

/// Duplicate codes come back as 409 `duplicate`
pub async fn create(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(payload): Json<CouponPayload>,
) -> Result<(StatusCode, Json<Coupon>)> {
    state.authorizer.require(&subject, permissions::COUPONS_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;

    let coupon = db::coupons::create(&state.db, &payload).await?;
    info!("Coupon {} created by {}", coupon.code, subject.user_id);

    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CouponPayload>,
) -> Result<Json<Coupon>> {
    state.authorizer.require(&subject, permissions::COUPONS_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;

    Ok(Json(db::coupons::update(&state.db, id, &payload).await?))
}

/// Bookings keep their stored discount; their coupon reference is cleared
pub async fn remove(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.authorizer.require(&subject, permissions::COUPONS_WRITE)?;

    db::coupons::delete(&state.db, id).await?;
    info!("Coupon {} deleted by {}", id, subject.user_id);

    Ok(StatusCode::NO_CONTENT)
}
