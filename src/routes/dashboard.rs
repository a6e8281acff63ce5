//! Dashboard summary

use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;

use crate::auth::{permissions, Subject};
use crate::cache::CacheStats;
use crate::db::{self, dashboard::DashboardStats};
use crate::error::Result;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub cache: CacheStats,
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
) -> Result<Json<StatsResponse>> {
    state.authorizer.require(&subject, permissions::DASHBOARD_READ)?;

    Ok(Json(StatsResponse {
        stats: db::dashboard::stats(&state.db).await?,
        cache: state.cache.stats(),
    }))
}
