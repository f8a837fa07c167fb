use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::membership_service::{self, MembershipError};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::{fail, ok, ApiResult};

const STATUSES: [&str; 4] = ["PENDING", "ACTIVE", "REJECTED", "REMOVED"];

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    status: Option<String>,
}

pub async fn list_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let status = match query.status.as_deref() {
        Some(s) if !STATUSES.contains(&s) => {
            return Err(fail(StatusCode::BAD_REQUEST, "unknown_status"))
        }
        other => other,
    };

    let memberships = membership_service::list_memberships(&pool, status)
        .await
        .map_err(map_error)?;
    Ok(ok(json!({ "memberships": memberships })))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    user_id: String,
    user_name: String,
    user_email: Option<String>,
}

pub async fn create_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<CreateBody>,
) -> ApiResult {
    if body.user_id.trim().is_empty() || body.user_name.trim().is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "missing_fields"));
    }

    let id = membership_service::create_application(
        &pool,
        body.user_id.trim(),
        body.user_name.trim(),
        body.user_email.as_deref(),
    )
    .await
    .map_err(map_error)?;
    Ok(ok(json!({ "id": id })))
}

pub async fn detail_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let detail = membership_service::load_detail(&pool, &id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(detail)))
}

pub async fn approve_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let detail = membership_service::approve(&pool, &id, &auth_user.id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(detail)))
}

pub async fn reject_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let detail = membership_service::reject(&pool, &id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(detail)))
}

#[derive(Debug, Deserialize, Default)]
pub struct RemoveBody {
    reason: Option<String>,
}

pub async fn remove_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    State(pool): State<SqlitePool>,
    body: Option<Json<RemoveBody>>,
) -> ApiResult {
    let reason = body.as_ref().and_then(|b| b.reason.as_deref());
    let detail = membership_service::remove(&pool, &id, &auth_user.id, reason)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(detail)))
}

#[derive(Debug, Deserialize, Default)]
pub struct RestoreBody {
    note: Option<String>,
}

pub async fn restore_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    State(pool): State<SqlitePool>,
    body: Option<Json<RestoreBody>>,
) -> ApiResult {
    let note = body.as_ref().and_then(|b| b.note.as_deref());
    let detail = membership_service::restore(&pool, &id, &auth_user.id, note)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(detail)))
}

fn map_error(e: MembershipError) -> (StatusCode, Json<serde_json::Value>) {
    match e {
        MembershipError::NotFound => fail(StatusCode::NOT_FOUND, "not_found"),
        MembershipError::AlreadyMember => fail(StatusCode::CONFLICT, "already_member"),
        MembershipError::InvalidStatus(_) => fail(StatusCode::CONFLICT, "invalid_status"),
        MembershipError::Db(e) => {
            warn!("Membership query failed: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}
