//! Bearer-token session gate for the API routes

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, Result};
use crate::AppState;

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject requests without a live session; otherwise make the [`Subject`]
/// available to handlers as an extension.
///
/// [`Subject`]: super::Subject
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(request.headers())
        .map(str::to_owned)
        .ok_or(AppError::Unauthorized)?;

    let subject = state
        .sessions
        .verify(&token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::debug!("Request authenticated as {}", subject.user_id);
    request.extensions_mut().insert(subject);

    Ok(next.run(request).await)
}
