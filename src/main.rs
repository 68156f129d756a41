//! Student Performance Prediction API
//!
//! Read-only service that annotates students with an academic risk level.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 STUDENT RISK API                         │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────┐  │
//! │  │  Router   │──▶│ StudentSource│──▶│ Risk Classifier │  │
//! │  │  (Axum)   │   │ fixed | file │   │ (Stage 1 rules) │  │
//! │  └───────────┘   └──────────────┘   └─────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;
mod source;

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::AppResult;
use source::{FixedRoster, JsonFileSource, StudentSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let production = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "student_risk_api=debug,tower_http=debug".into()))
        .with(production.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!production).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Student Risk API starting ({})...", config.environment);

    let source: Arc<dyn StudentSource> = match &config.student_data_path {
        Some(path) => {
            tracing::info!("Student data: {}", path.display());
            Arc::new(JsonFileSource::new(path.clone()))
        }
        None => {
            tracing::info!("Student data: built-in roster");
            Arc::new(FixedRoster::new().context("built-in roster is invalid")?)
        }
    };

    let app = create_router(AppState { source });

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn StudentSource>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route(
            "/api/v1/students/risk-assessment",
            get(handlers::students::risk_assessment),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::source::tests::{temp_roster, INVALID_ROSTER, VALID_ROSTER};

    fn app_with(source: Arc<dyn StudentSource>) -> Router {
        create_router(AppState { source })
    }

    fn fixed_app() -> Router {
        app_with(Arc::new(FixedRoster::new().unwrap()))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root() {
        let (status, body) = get_json(fixed_app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to the Student Performance Prediction API.");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(fixed_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_risk_assessment_fixed_roster() {
        let (status, body) = get_json(fixed_app(), "/api/v1/students/risk-assessment").await;
        assert_eq!(status, StatusCode::OK);

        let assessments = body.as_array().unwrap();
        let summary: Vec<(&str, &str)> = assessments
            .iter()
            .map(|a| {
                (
                    a["student_details"]["student_id"].as_str().unwrap(),
                    a["predicted_risk"].as_str().unwrap(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("LASU_CS_001", "High"),
                ("LASU_CS_002", "Low"),
                ("LASU_CS_003", "Medium"),
                ("LASU_CS_004", "Medium"),
                ("LASU_CS_005", "Low"),
                ("LASU_CS_006", "High"),
            ]
        );

        let first = &assessments[0];
        assert_eq!(first["student_details"]["cumulative_gpa"], 2.2);
        assert_eq!(first["student_details"]["attendance_percentage"], 55);
        assert_eq!(first["student_details"]["lab_access_rating"], 2);
        assert_eq!(first["student_details"]["weekly_coding_hours"], 2);
        assert_eq!(first["student_details"]["commute_impact"], 4);
        assert_eq!(
            first["justification"],
            "Low GPA or poor attendance are strong indicators of high academic risk."
        );
    }

    #[tokio::test]
    async fn test_risk_assessment_file_roster() {
        let path = temp_roster("http-valid", VALID_ROSTER);
        let app = app_with(Arc::new(JsonFileSource::new(&path)));
        let (status, body) = get_json(app, "/api/v1/students/risk-assessment").await;
        let _ = std::fs::remove_file(&path);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["predicted_risk"], "Low");
        assert_eq!(body[1]["predicted_risk"], "High");
    }

    #[tokio::test]
    async fn test_invalid_roster_is_unprocessable() {
        let path = temp_roster("http-invalid", INVALID_ROSTER);
        let app = app_with(Arc::new(JsonFileSource::new(&path)));
        let (status, body) = get_json(app, "/api/v1/students/risk-assessment").await;
        let _ = std::fs::remove_file(&path);

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], 422);
        assert_eq!(body["details"][0]["index"], 1);
        assert_eq!(body["details"][0]["violations"][0]["field"], "attendance_percentage");
    }

    #[tokio::test]
    async fn test_missing_field_is_unprocessable() {
        let path = temp_roster(
            "http-missing-field",
            r#"[
                {"student_id":"A","cumulative_gpa":3.6,"attendance_percentage":150,
                 "lab_access_rating":4,"weekly_coding_hours":10,"commute_impact":2},
                {"student_id":"B","cumulative_gpa":3.6,
                 "lab_access_rating":4,"weekly_coding_hours":10,"commute_impact":2}
            ]"#,
        );
        let app = app_with(Arc::new(JsonFileSource::new(&path)));
        let (status, body) = get_json(app, "/api/v1/students/risk-assessment").await;
        let _ = std::fs::remove_file(&path);

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["violations"][0]["code"], "range");
        assert_eq!(body["details"][1]["student_id"], "B");
        assert_eq!(body["details"][1]["violations"][0]["field"], "attendance_percentage");
        assert_eq!(body["details"][1]["violations"][0]["code"], "required");
    }

    #[tokio::test]
    async fn test_missing_roster_file() {
        let app = app_with(Arc::new(JsonFileSource::new("/nonexistent/roster.json")));
        let (status, body) = get_json(app, "/api/v1/students/risk-assessment").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Student data source unavailable");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = fixed_app()
            .oneshot(Request::builder().uri("/api/v1/students").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
