use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use serde::Serialize;

/// Used when neither the upload nor the data URI says what kind of image it is.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// A file as it arrives from the picker or a drop.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub file_name: Option<String>,
    pub mime_type: String,
    pub size_bytes: usize,
    /// `data:<mime>;base64,<payload>`, also used as the preview source.
    pub data_uri: String,
}

pub fn is_image_type(declared: &str) -> bool {
    declared.trim().to_ascii_lowercase().starts_with("image/")
}

pub fn mime_from_file_name(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Encodes an accepted upload. Returns `Ok(None)` for anything that is not a
/// non-empty image so callers can ignore it silently.
pub async fn encode_upload(upload: ImageUpload) -> Result<Option<EncodedImage>> {
    let declared = match upload.content_type.as_deref().map(str::trim) {
        Some(ct) if !ct.is_empty() => Some(ct.to_ascii_lowercase()),
        _ => upload
            .file_name
            .as_deref()
            .and_then(mime_from_file_name)
            .map(str::to_string),
    };

    let mime_type = match declared {
        Some(ct) if is_image_type(&ct) => ct,
        other => {
            log::debug!("🚫 Ignoring upload {:?} with type {:?}", upload.file_name, other);
            return Ok(None);
        }
    };

    if upload.bytes.is_empty() {
        log::debug!("🚫 Ignoring empty upload {:?}", upload.file_name);
        return Ok(None);
    }

    let size_bytes = upload.bytes.len();
    let bytes = upload.bytes;
    let payload = tokio::task::spawn_blocking(move || general_purpose::STANDARD.encode(&bytes)).await?;

    log::debug!("📊 Image size: {} bytes, base64 size: {} bytes", size_bytes, payload.len());

    Ok(Some(EncodedImage {
        file_name: upload.file_name,
        data_uri: format!("data:{};base64,{}", mime_type, payload),
        mime_type,
        size_bytes,
    }))
}

/// Drops a `data:<mime>;base64,` header if present.
pub fn strip_data_uri_prefix(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, payload)) if !payload.is_empty() => payload,
        _ => encoded,
    }
}

pub fn data_uri_mime_type(encoded: &str) -> Option<&str> {
    let header = encoded.strip_prefix("data:")?.split_once(',')?.0;
    let mime = header.split(';').next()?.trim();

    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}
