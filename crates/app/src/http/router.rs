use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::routes::{health, stale_paths, threads};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let cors = build_cors(&state);
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route(
            "/v1/threads",
            get(threads::list_threads).post(threads::create_thread),
        )
        .route("/v1/threads/{id}", get(threads::get_thread))
        .route("/v1/threads/{id}/comments", post(threads::add_comment))
        .route("/v1/stale-paths/drain", post(stale_paths::drain))
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    router
}

fn build_cors(state: &AppState) -> Option<CorsLayer> {
    let mut origins = Vec::new();
    let mut allow_any = false;
    for origin in state.config.cors_allow_origins.iter() {
        if origin.trim() == "*" {
            allow_any = true;
            break;
        }
        match HeaderValue::from_str(origin.trim()) {
            Ok(value) => origins.push(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "invalid CORS origin ignored");
            }
        }
    }
    if !allow_any && origins.is_empty() {
        return None;
    }

    let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST, Method::OPTIONS]);
    if allow_any {
        Some(cors.allow_origin(Any).allow_headers(Any))
    } else {
        Some(
            cors.allow_origin(AllowOrigin::list(origins))
                .allow_headers([CONTENT_TYPE]),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::{build, build_cors};
    use crate::config::AppConfig;
    use crate::state::AppState;
    use crate::wiring::{assemble, build_state};
    use threadline_core::domain::threads::User;
    use threadline_core::types::id::UserId;
    use threadline_infra::memory::MemoryThreadStore;

    async fn app_with_user() -> (AppState, UserId) {
        let store = Arc::new(MemoryThreadStore::default());
        let id = UserId::new();
        store
            .insert_user(User {
                id,
                name: "Ann".to_string(),
                username: "ann".to_string(),
                image: None,
                threads: Vec::new(),
            })
            .await;
        let state = assemble(AppConfig::for_tests(), store, None).unwrap();
        (state, id)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_memory_store() {
        let (state, _) = app_with_user().await;
        let response = build(state).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["store"], "memory");
        assert_eq!(body["revalidation"]["mode"], "local");
    }

    #[tokio::test]
    async fn create_comment_and_read_back() {
        let (state, author) = app_with_user().await;
        let app = build(state.clone());

        let response = app
            .clone()
            .oneshot(post_json(
                "/v1/threads",
                json!({ "text": "hello", "author": author.to_string(), "path": "/" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let thread_id = json_body(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/v1/threads/{thread_id}/comments"),
                json!({ "text": "reply", "user_id": author.to_string(), "path": "/thread" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(get("/v1/threads?pageNumber=1&pageSize=10"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let feed = json_body(response).await;
        assert_eq!(feed["is_next"], false);
        assert_eq!(feed["posts"].as_array().unwrap().len(), 1);
        assert_eq!(feed["posts"][0]["children"][0]["text"], "reply");

        let response = app
            .oneshot(get(&format!("/v1/threads/{thread_id}")))
            .await
            .unwrap();
        let detail = json_body(response).await;
        assert_eq!(detail["author"]["name"], "Ann");
        assert_eq!(detail["children"][0]["author"]["name"], "Ann");

        let stale = state.stale_paths.as_ref().unwrap();
        assert_eq!(
            stale.take().await.paths,
            vec!["/".to_string(), "/thread".to_string()]
        );
    }

    #[tokio::test]
    async fn comment_on_missing_thread_is_404() {
        let (state, author) = app_with_user().await;
        let response = build(state)
            .oneshot(post_json(
                &format!("/v1/threads/{}/comments", UserId::new()),
                json!({ "text": "reply", "user_id": author.to_string(), "path": "/" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("error adding comment: "));
    }

    #[tokio::test]
    async fn unknown_thread_is_null() {
        let (state, _) = app_with_user().await;
        let response = build(state)
            .oneshot(get(&format!("/v1/threads/{}", UserId::new())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, Value::Null);
    }

    #[tokio::test]
    async fn bad_page_is_400() {
        let (state, _) = app_with_user().await;
        let response = build(state)
            .oneshot(get("/v1/threads?page_number=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn seeded_user_can_post_without_database() {
        let author = UserId::new();
        let mut seeds = tempfile::NamedTempFile::new().unwrap();
        let users = json!([{ "id": author.to_string(), "name": "Ann", "username": "ann" }]);
        seeds.write_all(users.to_string().as_bytes()).unwrap();
        let mut config = AppConfig::for_tests();
        config.seed_users = Some(seeds.path().to_path_buf());
        let app = build(build_state(config).unwrap());

        let response = app
            .clone()
            .oneshot(post_json(
                "/v1/threads",
                json!({ "text": "hello", "author": author.to_string(), "path": "/" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.oneshot(get("/v1/threads")).await.unwrap();
        let feed = json_body(response).await;
        assert_eq!(feed["posts"][0]["author"]["username"], "ann");
    }

    #[tokio::test]
    async fn drain_returns_stale_paths_once() {
        let (state, author) = app_with_user().await;
        let app = build(state);
        for path in ["/b", "/a", "/b"] {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/v1/threads",
                    json!({ "text": "hello", "author": author.to_string(), "path": path }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .clone()
            .oneshot(post_json("/v1/stale-paths/drain", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "paths": ["/a", "/b"], "overflowed": false })
        );

        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(json_body(response).await["revalidation"]["stale_paths"], 0);
        let response = app
            .oneshot(post_json("/v1/stale-paths/drain", json!({})))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["paths"], json!([]));
    }

    #[tokio::test]
    async fn drain_is_404_when_revalidating_by_webhook() {
        let mut config = AppConfig::for_tests();
        config.revalidate_url = Some("http://127.0.0.1:9/revalidate".to_string());
        let state = assemble(config, Arc::new(MemoryThreadStore::default()), None).unwrap();
        let response = build(state)
            .oneshot(post_json("/v1/stale-paths/drain", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_json_body_is_400_with_error_body() {
        let (state, _) = app_with_user().await;
        let request = Request::builder()
            .method("POST")
            .uri("/v1/threads")
            .header("content-type", "application/json")
            .body(Body::from("{\"text\": "))
            .unwrap();
        let response = build(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("error creating thread: invalid request: ")
        );
    }

    #[tokio::test]
    async fn missing_comment_fields_are_400_with_error_body() {
        let (state, _) = app_with_user().await;
        let response = build(state)
            .oneshot(post_json(
                &format!("/v1/threads/{}/comments", UserId::new()),
                json!({ "text": "reply" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("error adding comment: invalid request: ")
        );
    }

    #[tokio::test]
    async fn non_numeric_page_is_400_with_error_body() {
        let (state, _) = app_with_user().await;
        let response = build(state)
            .oneshot(get("/v1/threads?page_number=abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("error fetching posts: invalid request: ")
        );
    }

    #[test]
    fn cors_disabled_without_origins() {
        let mut config = AppConfig::for_tests();
        let state = assemble(config.clone(), Arc::new(MemoryThreadStore::default()), None).unwrap();
        assert!(build_cors(&state).is_none());

        config.cors_allow_origins = vec![" * ".to_string()];
        let state = assemble(config, Arc::new(MemoryThreadStore::default()), None).unwrap();
        assert!(build_cors(&state).is_some());
    }
}
