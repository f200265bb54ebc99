use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use tracing::{error, warn};

use crate::actions::add_comment::{self, AddCommentParams};
use crate::actions::create_thread::{self, CreateThreadParams};
use crate::actions::fetch_posts::{self, FetchPostsParams};
use crate::actions::{Action, ActionError, ThreadsError, fetch_thread};
use crate::http::routes::ErrorBody;
use crate::state::AppState;
use threadline_core::domain::threads::{FeedPage, ThreadDetail};
use threadline_core::types::id::ThreadId;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: ThreadId,
}

pub async fn create_thread(
    State(state): State<AppState>,
    payload: Result<Json<CreateThreadParams>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ActionError> {
    let Json(params) =
        payload.map_err(|err| ActionError::rejected(Action::CreateThread, err.body_text()))?;
    let thread =
        create_thread::run(state.store.as_ref(), state.revalidator.as_ref(), params).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: thread.id })))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    payload: Result<Json<AddCommentParams>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ActionError> {
    let Json(params) =
        payload.map_err(|err| ActionError::rejected(Action::AddComment, err.body_text()))?;
    let comment = add_comment::run(
        state.store.as_ref(),
        state.revalidator.as_ref(),
        &thread_id,
        params,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: comment.id })))
}

pub async fn list_threads(
    State(state): State<AppState>,
    query: Result<Query<FetchPostsParams>, QueryRejection>,
) -> Result<Json<FeedPage>, ActionError> {
    let Query(params) =
        query.map_err(|err| ActionError::rejected(Action::FetchPosts, err.body_text()))?;
    let page = fetch_posts::run(state.store.as_ref(), params, state.config.max_page_size).await?;
    Ok(Json(page))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<ThreadDetail>>, ActionError> {
    let thread = fetch_thread::run(state.store.as_ref(), &id).await?;
    Ok(Json(thread))
}

impl IntoResponse for ActionError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.source {
            ThreadsError::Validation(_) => StatusCode::BAD_REQUEST,
            ThreadsError::NotFound { .. } => StatusCode::NOT_FOUND,
            ThreadsError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "thread action failed");
        } else {
            warn!(error = %self, "thread action rejected");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
