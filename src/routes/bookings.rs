//! Booking route handlers
//!
//! Creating or re-quoting a booking prices it through the pricing engine and
//! redeems the coupon in the same transaction that stores the booking.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{permissions, Subject};
use crate::db::{self, bookings::BookingFields};
use crate::error::{AppError, Result};
use crate::models::{
    Booking, BookingDetail, BookingStatus, CreateBookingPayload, UpdateBookingPayload,
    UpdateBookingStatusPayload,
};
use crate::pricing::requests::normalize_code;
use crate::pricing::services::{apply_redemption, resolve_services, validate_coupon_code};
use crate::pricing::{
    compute_subtotal, plan_redemption, validate_coupon, BookingQuote, CouponHolder,
    CouponValidation, PricedItem,
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
pub struct BookingListQuery {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<Booking>>> {
    state.authorizer.require(&subject, permissions::BOOKINGS_READ)?;
    Ok(Json(
        db::bookings::list(&state.db, query.status, query.client_id).await?,
    ))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDetail>> {
    state.authorizer.require(&subject, permissions::BOOKINGS_READ)?;
    let booking = db::bookings::get(&state.db, id).await?;
    Ok(Json(with_lines(&state, booking).await?))
}

/// An unknown or invalid coupon code does not fail the booking; it is saved
/// without a discount.
pub async fn create(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(payload): Json<CreateBookingPayload>,
) -> Result<(StatusCode, Json<BookingDetail>)> {
    state.authorizer.require(&subject, permissions::BOOKINGS_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;
    ensure_client(&state, payload.client_id).await?;

    let now = Utc::now();
    let services = resolve_services(&state.db, &state.cache, &payload.service_ids).await?;
    let subtotal = compute_subtotal(&services);

    let validation = match normalize_code(payload.coupon_code.as_deref()) {
        Some(code) => Some(validate_coupon_code(&state.db, code, subtotal, now).await?),
        None => None,
    };
    warn_if_rejected(payload.coupon_code.as_deref(), validation.as_ref());

    let quote = BookingQuote::new(&services, validation.as_ref(), now);
    let fields = BookingFields {
        client_id: payload.client_id,
        scheduled_for: payload.scheduled_for,
        delivery_address: payload.delivery_address,
        status: payload.status,
        notes: payload.notes,
    };

    let plan = plan_redemption(
        None,
        Some(CouponHolder {
            coupon_id: quote.coupon_id,
            client_id: fields.client_id,
        }),
    );

    let mut tx = state.db.begin().await?;
    apply_redemption(&mut *tx, &plan, fields.client_id).await?;
    let booking = db::bookings::insert(&mut *tx, &fields, &quote).await?;
    tx.commit().await?;

    info!(
        "Booking {} created for client {}: subtotal {}, discount {}, final {}",
        booking.id,
        booking.client_id,
        booking.subtotal,
        booking.discount_amount,
        booking.final_amount
    );

    Ok((StatusCode::CREATED, Json(with_lines(&state, booking).await?)))
}

/// Partial update. Stored amounts only change when `serviceIds` or
/// `couponCode` is sent; the booking is then re-priced from the new
/// selection, or from its own snapshot when only the coupon changes.
pub async fn update(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingPayload>,
) -> Result<Json<BookingDetail>> {
    state.authorizer.require(&subject, permissions::BOOKINGS_WRITE)?;
    payload.validate().map_err(AppError::BadRequest)?;

    let mut tx = state.db.begin().await?;
    let existing = db::bookings::lock(&mut *tx, id).await?;

    let mut fields = BookingFields::from(&existing);
    if let Some(client_id) = payload.client_id {
        if client_id != existing.client_id {
            ensure_client(&state, client_id).await?;
        }
        fields.client_id = client_id;
    }
    if let Some(scheduled_for) = payload.scheduled_for {
        fields.scheduled_for = scheduled_for;
    }
    if let Some(address) = &payload.delivery_address {
        fields.delivery_address = address.clone();
    }
    if let Some(status) = payload.status {
        fields.status = status;
    }
    if payload.notes.is_some() {
        fields.notes = payload.notes.clone();
    }

    let quote = if payload.requires_requote() {
        let now = Utc::now();
        let requested = payload.coupon_code.as_deref();
        let quote = match &payload.service_ids {
            Some(ids) => {
                let services = resolve_services(&state.db, &state.cache, ids).await?;
                requote(&state, &services, &existing, requested, now).await?
            }
            None => {
                let lines = db::bookings::service_lines_in(&mut *tx, id).await?;
                requote(&state, &lines, &existing, requested, now).await?
            }
        };

        Some(quote)
    } else {
        None
    };

    // A booking moved to another client keeps its coupon only within that
    // client's per-client cap
    let plan = plan_redemption(
        Some(CouponHolder {
            coupon_id: existing.coupon_id,
            client_id: existing.client_id,
        }),
        Some(CouponHolder {
            coupon_id: quote.as_ref().map_or(existing.coupon_id, |q| q.coupon_id),
            client_id: fields.client_id,
        }),
    );
    apply_redemption(&mut *tx, &plan, fields.client_id).await?;

    let booking = db::bookings::update(&mut *tx, id, &fields, quote.as_ref()).await?;
    tx.commit().await?;

    if let Some(quote) = &quote {
        info!(
            "Booking {} re-quoted: subtotal {}, discount {}, final {}",
            id, quote.amounts.subtotal, quote.amounts.discount_amount, quote.amounts.final_amount
        );
    }

    Ok(Json(with_lines(&state, booking).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusPayload>,
) -> Result<Json<Booking>> {
    state.authorizer.require(&subject, permissions::BOOKINGS_WRITE)?;

    let booking = db::bookings::set_status(&state.db, id, payload.status).await?;
    info!("Booking {} status set to {}", id, payload.status.as_str());

    Ok(Json(booking))
}

/// Deleting a booking gives its coupon use back
pub async fn remove(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.authorizer.require(&subject, permissions::BOOKINGS_WRITE)?;

    let mut tx = state.db.begin().await?;
    let booking = db::bookings::lock(&mut *tx, id).await?;
    let plan = plan_redemption(
        Some(CouponHolder {
            coupon_id: booking.coupon_id,
            client_id: booking.client_id,
        }),
        None,
    );
    apply_redemption(&mut *tx, &plan, booking.client_id).await?;
    db::bookings::delete(&mut *tx, id).await?;
    tx.commit().await?;

    info!("Booking {} deleted by {}", id, subject.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Price `items` with the requested coupon.
///
/// `requested` of `None` keeps the booking's current coupon (re-checked
/// against the new subtotal); a blank code removes it.
async fn requote<T: PricedItem>(
    state: &AppState,
    items: &[T],
    existing: &Booking,
    requested: Option<&str>,
    now: DateTime<Utc>,
) -> Result<BookingQuote> {
    let subtotal = compute_subtotal(items);

    let validation = match requested {
        Some(raw) => match normalize_code(Some(raw)) {
            Some(code) => Some(validate_coupon_code(&state.db, code, subtotal, now).await?),
            None => None,
        },
        None => match existing.coupon_id {
            Some(coupon_id) => {
                let coupon = db::coupons::get(&state.db, coupon_id).await?;
                Some(validate_coupon(Some(&coupon), subtotal, now))
            }
            None => None,
        },
    };
    warn_if_rejected(requested, validation.as_ref());

    Ok(BookingQuote::new(items, validation.as_ref(), now))
}

fn warn_if_rejected(code: Option<&str>, validation: Option<&CouponValidation>) {
    if let Some(rejection) = validation.and_then(|v| v.rejection()) {
        warn!(
            "Coupon {:?} not applied: {}",
            code.unwrap_or("current coupon"),
            rejection.reason()
        );
    }
}

async fn ensure_client(state: &AppState, client_id: Uuid) -> Result<()> {
    match db::clients::get(&state.db, client_id).await {
        Ok(_) => Ok(()),
        Err(AppError::NotFound) => Err(AppError::BadRequest(format!(
            "Unknown client id {}",
            client_id
        ))),
        Err(e) => Err(e),
    }
}

async fn with_lines(state: &AppState, booking: Booking) -> Result<BookingDetail> {
    let services = db::bookings::service_lines(&state.db, booking.id).await?;
    Ok(BookingDetail { booking, services })
}
