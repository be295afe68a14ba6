use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::error::{AnalysisError, ANALYSIS_FAILED_MESSAGE};
use crate::handlers::{AnalysisHandler, Session};
use crate::models::FishAnalysis;

pub mod pages; // server-rendered upload page

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<AnalysisHandler>,
}

#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    /// Data URI or bare base64 payload
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn create_router(handler: Arc<AnalysisHandler>, static_dir: &Path, max_upload_bytes: usize) -> Router {
    let state = AppState { handler };

    Router::new()
        .route("/", get(pages::index))
        .route("/image", post(pages::upload_image))
        .route("/image/clear", post(pages::clear_image))
        .route("/analyze", post(pages::analyze))
        .route("/api/session", get(get_session))
        .route(
            "/api/identify",
            post(identify).layer(DefaultBodyLimit::max(json_body_limit(max_upload_bytes))),
        )
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Base64 inflates an upload by 4/3; leave room for the data URI prefix and JSON framing.
fn json_body_limit(max_upload_bytes: usize) -> usize {
    (max_upload_bytes / 3 + 1).saturating_mul(4).saturating_add(64 * 1024)
}

async fn get_session(State(state): State<AppState>) -> Json<Session> {
    Json(state.handler.snapshot().await)
}

/// One-shot identification that bypasses the page session.
async fn identify(
    State(state): State<AppState>,
    Json(request): Json<IdentifyRequest>,
) -> Result<Json<FishAnalysis>, (StatusCode, Json<ErrorResponse>)> {
    let image = request.image.trim();
    if image.is_empty() || image.ends_with(',') {
        log::warn!("⚠️ Identify request without image data");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Nenhuma imagem enviada.".to_string(),
            }),
        ));
    }

    log::info!("📨 API identify request: {} bytes", image.len());

    match state.handler.identify(image).await {
        Ok(analysis) => Ok(Json(analysis)),
        Err(e) => {
            log::error!("❌ API identify failed: {}", e);
            Err((
                status_for(&e),
                Json(ErrorResponse {
                    error: ANALYSIS_FAILED_MESSAGE.to_string(),
                }),
            ))
        }
    }
}

fn status_for(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::Configuration => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::Transport(_) | AnalysisError::Validation(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ai_service::mock::MockTransport;
    use crate::services::AnalysisClient;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const TILAPIA: &str = r#"{"name":"Tilápia","scientificName":"Oreochromis niloticus","confidence":92,"habitat":"água doce","description":"...","edible":true}"#;

    fn app_with(transport: Arc<MockTransport>, api_key: Option<&str>) -> Router {
        let client = AnalysisClient::new(api_key.map(str::to_string), "gemini-2.5-flash".to_string(), transport);
        let handler = Arc::new(AnalysisHandler::new(Arc::new(client)));
        create_router(handler, Path::new("static"), 1024 * 1024)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(content_type: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "peixescan-boundary";
        let mut body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"peixe.png\"\r\nContent-Type: {}\r\n\r\n",
            boundary, content_type
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/image")
            .header("content-type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = app_with(Arc::new(MockTransport::replying_with_text(TILAPIA)), Some("key"));

        let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_identify_success() {
        let app = app_with(Arc::new(MockTransport::replying_with_text(TILAPIA)), Some("key"));

        let response = app
            .oneshot(json_request("/api/identify", serde_json::json!({ "image": "data:image/jpeg;base64,/9j/4A==" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "Tilápia");
        assert_eq!(json["scientificName"], "Oreochromis niloticus");
        assert_eq!(json["edible"], true);
    }

    #[tokio::test]
    async fn test_api_identify_without_key() {
        let transport = Arc::new(MockTransport::replying_with_text(TILAPIA));
        let app = app_with(transport.clone(), None);

        let response = app
            .oneshot(json_request("/api/identify", serde_json::json!({ "image": "/9j/4A==" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"], ANALYSIS_FAILED_MESSAGE);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_api_identify_bad_upstream_body() {
        let app = app_with(Arc::new(MockTransport::replying("oops")), Some("key"));

        let response = app
            .oneshot(json_request("/api/identify", serde_json::json!({ "image": "/9j/4A==" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_api_identify_empty_image() {
        let transport = Arc::new(MockTransport::replying_with_text(TILAPIA));
        let app = app_with(transport.clone(), Some("key"));

        let response = app
            .oneshot(json_request("/api/identify", serde_json::json!({ "image": "data:image/png;base64," })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_json_body_limit_fits_encoded_upload() {
        let max = 1024 * 1024;

        assert!(json_body_limit(max) >= max * 4 / 3);
        assert_eq!(json_body_limit(usize::MAX), usize::MAX);
    }

    #[tokio::test]
    async fn test_api_identify_accepts_max_size_image() {
        let transport = Arc::new(MockTransport::replying_with_text(TILAPIA));
        let app = app_with(transport.clone(), Some("key"));
        // a full 1 MiB upload, base64 encoded
        let image = format!("data:image/jpeg;base64,{}", "A".repeat(1024 * 1024 / 3 * 4));

        let response = app
            .oneshot(json_request("/api/identify", serde_json::json!({ "image": image })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_api_identify_rejects_oversized_body() {
        let transport = Arc::new(MockTransport::replying_with_text(TILAPIA));
        let app = app_with(transport.clone(), Some("key"));
        let image = "A".repeat(2 * 1024 * 1024);

        let response = app
            .oneshot(json_request("/api/identify", serde_json::json!({ "image": image })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_page_flow_upload_then_analyze() {
        let transport = Arc::new(MockTransport::replying_with_text(TILAPIA));
        let app = app_with(transport.clone(), Some("key"));

        let response = app.clone().oneshot(multipart_request("image/png", b"\x89PNG")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let session = body_json(app.clone().oneshot(empty_request("GET", "/api/session")).await.unwrap()).await;
        assert_eq!(session["status"], "IDLE");
        assert_eq!(session["image"]["mimeType"], "image/png");

        let response = app.clone().oneshot(empty_request("POST", "/analyze")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(transport.calls(), 1);

        let session = body_json(app.clone().oneshot(empty_request("GET", "/api/session")).await.unwrap()).await;
        assert_eq!(session["status"], "SUCCESS");
        assert_eq!(session["outcome"]["value"]["name"], "Tilápia");

        let page = app.oneshot(empty_request("GET", "/")).await.unwrap();
        let bytes = axum::body::to_bytes(page.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("PeixeScan AI"));
        assert!(html.contains("<h2>Tilápia</h2>"));
    }

    #[tokio::test]
    async fn test_page_non_image_upload_is_ignored() {
        let transport = Arc::new(MockTransport::replying_with_text(TILAPIA));
        let app = app_with(transport.clone(), Some("key"));

        let response = app.clone().oneshot(multipart_request("text/plain", b"hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app.clone().oneshot(empty_request("POST", "/analyze")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let session = body_json(app.oneshot(empty_request("GET", "/api/session")).await.unwrap()).await;
        assert!(session["image"].is_null());
        assert_eq!(session["status"], "IDLE");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_page_clear_image() {
        let app = app_with(Arc::new(MockTransport::replying_with_text(TILAPIA)), Some("key"));

        app.clone().oneshot(multipart_request("image/jpeg", b"\xFF\xD8")).await.unwrap();
        let response = app.clone().oneshot(empty_request("POST", "/image/clear")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let session = body_json(app.oneshot(empty_request("GET", "/api/session")).await.unwrap()).await;
        assert!(session["image"].is_null());
    }
}
