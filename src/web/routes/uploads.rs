use axum::{extract::Multipart, http::StatusCode, Extension};
use serde_json::json;
use tracing::warn;

use crate::services::upload_service::{self, UploadError, UploadKind};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::{fail, ok, ApiResult};

pub async fn activity_image_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> ApiResult {
    handle_upload(UploadKind::Image, multipart).await
}

pub async fn news_image_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> ApiResult {
    handle_upload(UploadKind::Image, multipart).await
}

pub async fn news_pdf_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> ApiResult {
    handle_upload(UploadKind::Pdf, multipart).await
}

async fn handle_upload(kind: UploadKind, mut multipart: Multipart) -> ApiResult {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Multipart read failed: {}", e);
        fail(StatusCode::BAD_REQUEST, "bad_multipart")
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            return Err(fail(StatusCode::BAD_REQUEST, "missing_filename"));
        };
        let bytes = field.bytes().await.map_err(|e| {
            warn!("Multipart body read failed: {}", e);
            fail(StatusCode::BAD_REQUEST, "bad_multipart")
        })?;

        let dir = upload_service::upload_dir_from_env();
        let url = upload_service::store_file(&dir, kind, &filename, &bytes)
            .await
            .map_err(map_error)?;
        return Ok(ok(json!({ "url": url })));
    }

    Err(map_error(UploadError::MissingFile))
}

fn map_error(e: UploadError) -> (StatusCode, axum::Json<serde_json::Value>) {
    match e {
        UploadError::MissingFile => fail(StatusCode::BAD_REQUEST, "missing_file"),
        UploadError::UnsupportedType(_) => fail(StatusCode::BAD_REQUEST, "unsupported_type"),
        UploadError::TooLarge(_) => fail(StatusCode::PAYLOAD_TOO_LARGE, "file_too_large"),
        UploadError::Io(e) => {
            warn!("Upload write failed: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}
