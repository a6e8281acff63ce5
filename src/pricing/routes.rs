//! HTTP handlers for coupon validation and booking quotes.

use axum::{extract::State, routing::post, Extension, Json, Router};
use chrono::Utc;

use crate::auth::{permissions, Subject};
use crate::error::{AppError, Result};
use crate::validation;
use crate::AppState;

use super::requests::{normalize_code, QuoteRequest, ValidateCouponRequest};
use super::responses::{CouponValidationResponse, QuoteResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/coupons/validate", post(validate_coupon))
        .route("/pricing/quote", post(quote))
}

/// Invalid coupons are a normal 200 response with `isValid: false`
pub async fn validate_coupon(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(req): Json<ValidateCouponRequest>,
) -> Result<Json<CouponValidationResponse>> {
    state
        .authorizer
        .require(&subject, permissions::COUPONS_VALIDATE)?;
    validation::require_money("amount", req.amount).map_err(AppError::BadRequest)?;

    let code = normalize_code(Some(&req.code))
        .ok_or_else(|| AppError::BadRequest("code must not be empty".to_string()))?;

    let result = services::validate_coupon_code(&state.db, code, req.amount, Utc::now()).await?;

    Ok(Json(CouponValidationResponse::from(&result)))
}

/// Preview a booking's amounts without saving anything
pub async fn quote(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    state.authorizer.require(&subject, permissions::BOOKINGS_READ)?;
    validation::require_selection("serviceIds", &req.service_ids).map_err(AppError::BadRequest)?;

    let (quote, coupon) = services::quote_selection(
        &state.db,
        &state.cache,
        &req.service_ids,
        normalize_code(req.coupon_code.as_deref()),
        Utc::now(),
    )
    .await?;

    Ok(Json(QuoteResponse::new(&quote, coupon.as_ref())))
}
