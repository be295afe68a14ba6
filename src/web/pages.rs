use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, Redirect},
};

use crate::error::SessionError;
use crate::presenter;
use crate::services::ImageUpload;
use crate::web::AppState;

/// Current session rendered as the upload page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.handler.snapshot().await;
    Html(presenter::render_page(&session))
}

/// Accepts the `image` field from the picker or a drop. Non-image files are
/// ignored and the page is shown unchanged.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, StatusCode> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        log::error!("❌ Failed to read multipart body: {}", e);
        StatusCode::BAD_REQUEST
    })? {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            log::error!("❌ Failed to read uploaded file: {}", e);
            StatusCode::BAD_REQUEST
        })?;

        let upload = ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        };

        match state.handler.handle_upload(upload).await {
            Ok(true) => log::info!("✅ Image selected"),
            Ok(false) => log::info!("ℹ️ Upload ignored, not an image"),
            Err(e) => match e.downcast_ref::<SessionError>() {
                Some(err) => log::warn!("⚠️ Upload refused: {}", err),
                None => {
                    log::error!("❌ Failed to encode upload: {}", e);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            },
        }
        break;
    }

    Ok(Redirect::to("/"))
}

pub async fn clear_image(State(state): State<AppState>) -> Redirect {
    if let Err(e) = state.handler.clear_image().await {
        log::warn!("⚠️ Clear refused: {}", e);
    }
    Redirect::to("/")
}

/// Runs the analysis to completion before redirecting back to the page.
pub async fn analyze(State(state): State<AppState>) -> Redirect {
    if let Err(e) = state.handler.analyze().await {
        log::warn!("⚠️ Analysis not started: {}", e);
    }
    Redirect::to("/")
}
