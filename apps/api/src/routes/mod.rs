pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/api/v1/resumes/:id", get(resumes::handle_get_resume))
        .route(
            "/api/v1/resumes/:id/duplicate",
            post(resumes::handle_duplicate_resume),
        )
        // Analysis API
        .route(
            "/api/v1/resumes/:id/analyses",
            post(analysis::handle_analyze).get(analysis::handle_list_analyses),
        )
        .route(
            "/api/v1/resumes/:id/analyses/:analysis_id",
            delete(analysis::handle_delete_analysis),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::store::memory::MemoryAnalysisStore;
    use crate::config::Config;
    use crate::llm_client::LlmClient;

    fn test_state() -> AppState {
        let config = Config {
            database_url: "postgres://localhost/unused".to_string(),
            generation_api_url: "http://127.0.0.1:9/unused".to_string(),
            generation_api_key: None,
            port: 0,
            rust_log: "info".to_string(),
        };
        AppState {
            db: PgPoolOptions::new()
                .connect_lazy(&config.database_url)
                .unwrap(),
            llm: Arc::new(LlmClient::new(config.generation_api_url.clone(), None).unwrap()),
            analyses: Arc::new(MemoryAnalysisStore::default()),
            config,
        }
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = build_router(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_user_id() {
        let response = build_router(test_state())
            .oneshot(
                Request::post(format!("/api/v1/resumes/{}/analyses", uuid::Uuid::new_v4()))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"job_description":"Rust"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = build_router(test_state())
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
