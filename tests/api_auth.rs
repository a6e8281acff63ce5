use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::util::ServiceExt;

use gasdelivery_web::auth::{Authorizer, StaticSessionVerifier, Subject};
use gasdelivery_web::cache::AppCache;
use gasdelivery_web::{build_router, AppState};

const TOKEN: &str = "test-token";

fn subject() -> Subject {
    Subject {
        user_id: "operator-1".to_string(),
        email: Some("ops@gas.example.com".to_string()),
        role: Some("operator".to_string()),
    }
}

/// Router over a pool that never connects. Only requests rejected before
/// any query runs may be sent through it.
fn app(authorizer: Authorizer) -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/gasdelivery_test")
        .unwrap();
    let sessions = StaticSessionVerifier::new().with_token(TOKEN, subject());

    build_router(AppState::new(
        pool,
        AppCache::default(),
        Arc::new(sessions),
        authorizer,
    ))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_needs_no_session() {
    let response = app(Authorizer::allow_authenticated())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn api_without_token_is_unauthorized() {
    let response = app(Authorizer::allow_authenticated())
        .oneshot(
            Request::builder()
                .uri("/api/clients")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthorized");
}

#[tokio::test]
async fn api_with_unknown_token_is_unauthorized() {
    let response = app(Authorizer::allow_authenticated())
        .oneshot(
            Request::builder()
                .uri("/api/bookings")
                .header(header::AUTHORIZATION, "Bearer not-a-session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn denied_permission_is_forbidden() {
    let deny_all = Authorizer::new(|_: &Subject, _: &str| false);

    let response = app(deny_all)
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/stats")
                .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "forbidden");
}

#[tokio::test]
async fn validate_coupon_rejects_blank_code() {
    let response = app(Authorizer::allow_authenticated())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/coupons/validate")
                .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"code":"   ","amount":"150.00"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn validate_coupon_rejects_negative_amount() {
    let response = app(Authorizer::allow_authenticated())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/coupons/validate")
                .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"code":"GAS10","amount":-5}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validate_coupon_rejects_amount_beyond_storable_money() {
    let response = app(Authorizer::allow_authenticated())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/coupons/validate")
                .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"code":"GAS10","amount":"79228162514264337593543950335"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn quote_requires_a_selection() {
    let response = app(Authorizer::allow_authenticated())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/pricing/quote")
                .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"serviceIds":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_create_validates_before_touching_the_database() {
    let response = app(Authorizer::allow_authenticated())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/bookings")
                .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{
                        "clientId": "6f1c2b7e-3a55-4d0e-9a77-0c6d5f1e2a10",
                        "serviceIds": [],
                        "scheduledFor": "2026-11-02T09:00:00Z",
                        "deliveryAddress": "Rua das Flores, 12"
                    }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
