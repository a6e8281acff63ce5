//! HTTP route handlers

pub mod bookings;
pub mod clients;
pub mod coupons;
pub mod dashboard;
pub mod payments;
pub mod services;

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe, no auth
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
