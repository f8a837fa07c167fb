use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::notification_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::{fail, ok, ApiResult};

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    unread_only: Option<bool>,
}

pub async fn list_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let view = notification_service::list_for_user(
        &pool,
        &auth_user.id,
        query.unread_only.unwrap_or(false),
    )
    .await
    .map_err(|e| {
        warn!("Notification query failed: {}", e);
        fail(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
    })?;
    Ok(ok(json!(view)))
}

pub async fn mark_read_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let changed = notification_service::mark_read(&pool, &id, &auth_user.id)
        .await
        .map_err(|e| {
            warn!("Notification update failed: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        })?;
    if changed == 0 {
        return Err(fail(StatusCode::NOT_FOUND, "not_found"));
    }
    Ok(ok(json!(null)))
}

pub async fn mark_all_read_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let changed = notification_service::mark_all_read(&pool, &auth_user.id)
        .await
        .map_err(|e| {
            warn!("Notification update failed: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        })?;
    Ok(ok(json!({ "marked": changed })))
}
