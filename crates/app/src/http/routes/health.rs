use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub database: DatabaseStatus,
    pub revalidation: RevalidationStatus,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub configured: bool,
    pub connected: bool,
}

#[derive(Debug, Serialize)]
pub struct RevalidationStatus {
    pub mode: &'static str,
    pub stale_paths: Option<usize>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = state.db.as_ref().is_some_and(|db| db.is_connected());
    let stale_paths = match state.stale_paths.as_ref() {
        Some(stale) => Some(stale.len().await),
        None => None,
    };
    Json(HealthResponse {
        status: "ok",
        store: if state.db.is_some() { "postgres" } else { "memory" },
        database: DatabaseStatus {
            configured: state.db.is_some(),
            connected,
        },
        revalidation: RevalidationStatus {
            mode: if stale_paths.is_some() { "local" } else { "webhook" },
            stale_paths,
        },
    })
}
