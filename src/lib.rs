//! Backend for the gas delivery admin dashboard.
//!
//! JSON API over PostgreSQL for clients, services, bookings, payments and
//! discount coupons. Booking amounts come from the [`pricing`] engine and are
//! frozen on the booking when it is saved.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::{Authorizer, SessionVerifier};
use crate::cache::AppCache;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub sessions: Arc<dyn SessionVerifier>,
    pub authorizer: Authorizer,
}

impl AppState {
    pub fn new(
        db: PgPool,
        cache: AppCache,
        sessions: Arc<dyn SessionVerifier>,
        authorizer: Authorizer,
    ) -> Self {
        Self {
            db,
            cache,
            sessions,
            authorizer,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/clients", routes::clients::router())
        .nest("/services", routes::services::router())
        .nest("/coupons", routes::coupons::router())
        .nest("/bookings", routes::bookings::router())
        .nest("/payments", routes::payments::router())
        .nest("/dashboard", routes::dashboard::router())
        .merge(pricing::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
