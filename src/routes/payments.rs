//! Payment route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{permissions, Subject};
use crate::db;
use crate::error::{AppError, Result};
use crate::models::{
    resolve_paid_at, CreatePaymentPayload, Payment, PaymentStatus, UpdatePaymentPayload,
    UpdatePaymentStatusPayload,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(remove))
        .route("/:id/status", patch(update_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentListQuery {
    #[serde(default)]
    pub booking_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<Vec<Payment>>> {
    state.authorizer.require(&subject, permissions::PAYMENTS_READ)?;
    Ok(Json(
        db::payments::list(&state.db, query.booking_id, query.status).await?,
    ))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>> {
    state.authorizer.require(&subject, permissions::PAYMENTS_READ)?;
    Ok(Json(db::payments::get(&state.db, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(payload): Json<CreatePaymentPayload>,
) -> Result<(StatusCode, Json<Payment>)> {
    state.authorizer.require(&subject, permissions::PAYMENTS_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;

    match db::bookings::get(&state.db, payload.booking_id).await {
        Ok(_) => {}
        Err(AppError::NotFound) => {
            return Err(AppError::BadRequest(format!(
                "Unknown booking id {}",
                payload.booking_id
            )))
        }
        Err(e) => return Err(e),
    }

    let paid_at = resolve_paid_at(payload.status, payload.paid_at, Utc::now());
    let payment = db::payments::create(&state.db, &payload, paid_at).await?;
    info!(
        "Payment {} of {} recorded for booking {}",
        payment.id, payment.amount, payment.booking_id
    );

    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentPayload>,
) -> Result<Json<Payment>> {
    state.authorizer.require(&subject, permissions::PAYMENTS_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;

    let paid_at = resolve_paid_at(payload.status, payload.paid_at, Utc::now());
    Ok(Json(
        db::payments::update(&state.db, id, &payload, paid_at).await?,
    ))
}

/// Marking a payment paid without `paidAt` stamps it with the current time
pub async fn update_status(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentStatusPayload>,
) -> Result<Json<Payment>> {
    state.authorizer.require(&subject, permissions::PAYMENTS_WRITE)?;

    let paid_at = resolve_paid_at(payload.status, payload.paid_at, Utc::now());
    let payment = db::payments::set_status(&state.db, id, payload.status, paid_at).await?;
    info!("Payment {} status set to {:?}", id, payment.status);

    Ok(Json(payment))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.authorizer.require(&subject, permissions::PAYMENTS_WRITE)?;
    db::payments::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
