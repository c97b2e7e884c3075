//! Vaccine Adverse Event Risk Predictor
//!
//! Serves a form that encodes four vaccine-administration fields into the
//! feature row of a pre-trained classifier and reports the predicted
//! probability of a serious adverse event.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        VAXRISK                           │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────────┐   ┌──────────────┐  │
//! │  │  Pages &   │──▶│ Feature Vector │──▶│  RiskEngine  │  │
//! │  │  JSON API  │   │    Builder     │   │  (Arc, r/o)  │  │
//! │  │  (Axum)    │   └────────────────┘   └──────┬───────┘  │
//! │  └────────────┘                               ▼          │
//! │                         ┌─────────────────────────────┐  │
//! │                         │ model + feature_columns.json│  │
//! │                         └─────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod inference;
pub mod model;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use error::{AppError, AppResult};
pub use inference::RiskEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: RiskEngine,
    pub config: config::Config,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Dashboard pages
    let page_routes = Router::new()
        .route("/", get(handlers::pages::index))
        .route("/predict", post(handlers::pages::predict))
        .route("/problem-statement", get(handlers::pages::problem_statement));

    // JSON API
    let api_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/schema", get(handlers::schema::get))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        );

    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::inference::tests::{fixed_engine, forest_engine};

    fn app(engine: RiskEngine) -> Router {
        create_router(AppState { engine, config: config::Config::default() })
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let response = app(fixed_engine(0.2))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Predict Risk"));
        assert!(html.contains("Intramuscular (IM)"));
    }

    #[tokio::test]
    async fn test_problem_statement_page() {
        let response = app(fixed_engine(0.2))
            .oneshot(Request::get("/problem-statement").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Project Aim"));
    }

    #[tokio::test]
    async fn test_form_submission_renders_result() {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "manufacturer=MODERNA&dose=1&route=Intramuscular+%28IM%29&site=Left+Arm+%28LA%29",
            ))
            .unwrap();
        let response = app(fixed_engine(0.73)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("73.00%"));
        assert!(html.contains("<strong>High Risk</strong>"));
    }

    #[tokio::test]
    async fn test_form_with_unknown_route_is_rejected() {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("manufacturer=MODERNA&dose=1&route=Nasal&site=Other"))
            .unwrap();
        let response = app(fixed_engine(0.73)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("Invalid route selection"));
    }

    #[tokio::test]
    async fn test_api_predict_with_debug_row() {
        let request = json_request(
            "/api/v1/predict",
            json!({
                "manufacturer": "PFIZER\\BIONTECH",
                "dose": 3,
                "route": "Other",
                "site": "Other",
                "debug": true
            }),
        );
        let response = app(forest_engine()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["display_percentage"], "60.00%");
        assert_eq!(body["risk_level"], "high");
        assert_eq!(body["label"], "High Risk");

        let columns = body["features"]["columns"].as_array().unwrap();
        assert_eq!(columns.len(), 7);
        assert_eq!(columns[0]["column"], "VAX_DOSE_SERIES");
        assert_eq!(columns[0]["value"], 3.0);
        assert_eq!(columns[2]["column"], "VAX_MANU_PFIZER\\BIONTECH");
        assert_eq!(columns[2]["value"], 1.0);
        assert_eq!(body["features"]["encodings"]["route"]["kind"], "baseline");
    }

    #[tokio::test]
    async fn test_api_predict_omits_row_without_debug() {
        let request = json_request(
            "/api/v1/predict",
            json!({
                "manufacturer": "MODERNA",
                "dose": 1,
                "route": "Syringe (SYR)",
                "site": "Right Arm (RA)"
            }),
        );
        let response = app(fixed_engine(0.5)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["label"], "Low Risk");
        assert!(body.get("features").is_none());
    }

    #[tokio::test]
    async fn test_api_rejects_invalid_selection() {
        let request = json_request(
            "/api/v1/predict",
            json!({ "manufacturer": "MODERNA", "dose": 4, "route": "Other", "site": "Other" }),
        );
        let response = app(fixed_engine(0.5)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().contains("dose"));
    }

    #[tokio::test]
    async fn test_api_rejects_empty_label() {
        let request = json_request(
            "/api/v1/predict",
            json!({ "manufacturer": "", "dose": 1, "route": "Other", "site": "Other" }),
        );
        let response = app(fixed_engine(0.5)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    async fn json_error(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_api_out_of_range_dose_is_invalid_selection() {
        for dose in [300, -1] {
            let request = json_request(
                "/api/v1/predict",
                json!({ "manufacturer": "MODERNA", "dose": dose, "route": "Other", "site": "Other" }),
            );
            let (status, body) = json_error(app(fixed_engine(0.5)).oneshot(request).await.unwrap()).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["status"], 400);
            assert_eq!(
                body["error"].as_str().unwrap(),
                format!("Invalid dose selection: \"{}\"", dose)
            );
        }
    }

    #[tokio::test]
    async fn test_api_missing_field_is_invalid_selection() {
        let request = json_request(
            "/api/v1/predict",
            json!({ "manufacturer": "MODERNA", "dose": 1, "route": "Other" }),
        );
        let (status, body) = json_error(app(fixed_engine(0.5)).oneshot(request).await.unwrap()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid site selection"));
    }

    #[tokio::test]
    async fn test_api_unparseable_body_gets_json_error() {
        let request = Request::post("/api/v1/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, body) = json_error(app(fixed_engine(0.5)).oneshot(request).await.unwrap()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().starts_with("Malformed request"));
    }

    #[tokio::test]
    async fn test_form_missing_field_renders_error_page() {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("manufacturer=MODERNA&dose=1&route=Other"))
            .unwrap();
        let response = app(fixed_engine(0.5)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_string(response).await;
        assert!(html.contains("Invalid site selection"));
        assert!(html.contains("Predict Risk"));
    }

    #[tokio::test]
    async fn test_form_wrong_content_type_renders_error_page() {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("manufacturer=MODERNA"))
            .unwrap();
        let response = app(fixed_engine(0.5)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("Malformed request"));
    }

    #[tokio::test]
    async fn test_model_failure_reaches_form_user() {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("manufacturer=MODERNA&dose=2&route=Other&site=Other"))
            .unwrap();
        let response = app(fixed_engine(f64::NAN)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = body_string(response).await;
        assert!(html.contains("Prediction failed"));
        assert!(html.contains("invalid probability"));
    }

    #[tokio::test]
    async fn test_model_failure_reaches_api_user() {
        let request = json_request(
            "/api/v1/predict",
            json!({ "manufacturer": "MODERNA", "dose": 2, "route": "Other", "site": "Other" }),
        );
        let (status, body) = json_error(app(fixed_engine(f64::NAN)).oneshot(request).await.unwrap()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 500);
        assert!(body["error"].as_str().unwrap().starts_with("Prediction failed"));
    }

    #[tokio::test]
    async fn test_schema_and_health() {
        let router = app(forest_engine());

        let response = router
            .clone()
            .oneshot(Request::get("/api/v1/schema").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["columns"][0], "VAX_DOSE_SERIES");
        assert_eq!(body["options"]["dose"], json!([1, 2, 3]));
        assert_eq!(body["options"]["route"][2], "Other");

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"]["kind"], "random_forest");
        assert_eq!(body["model"]["n_features"], 7);
    }
}
