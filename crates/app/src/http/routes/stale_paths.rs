use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::debug;

use crate::http::routes::ErrorBody;
use crate::state::AppState;
use threadline_infra::revalidate::StaleBatch;

/// Hands the renderer every path marked stale since the last drain.
pub async fn drain(
    State(state): State<AppState>,
) -> Result<Json<StaleBatch>, (StatusCode, Json<ErrorBody>)> {
    let Some(stale) = state.stale_paths.as_ref() else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "revalidation is delivered by webhook".to_string(),
            }),
        ));
    };
    let batch = stale.take().await;
    debug!(
        drained = batch.paths.len(),
        overflowed = batch.overflowed,
        "stale paths drained"
    );
    Ok(Json(batch))
}
