use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::activity_service::{self, ActivityError, ActivityPayload};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::{fail, ok, ApiResult};

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    scope: Option<String>, // upcoming|past
    status: Option<String>,
}

pub async fn list_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let past = match query.scope.as_deref() {
        None | Some("upcoming") => false,
        Some("past") => true,
        Some(_) => return Err(fail(StatusCode::BAD_REQUEST, "unknown_scope")),
    };

    let activities = activity_service::list_activities(&pool, past, query.status.as_deref())
        .await
        .map_err(map_error)?;
    Ok(ok(json!({ "activities": activities })))
}

pub async fn create_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(payload): Json<ActivityPayload>,
) -> ApiResult {
    let activity_id = activity_service::create_activity(&pool, &auth_user.id, payload)
        .await
        .map_err(map_error)?;
    Ok(ok(json!({ "activity_id": activity_id })))
}

pub async fn detail_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let detail = activity_service::load_detail(&pool, &activity_id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(detail)))
}

pub async fn update_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(payload): Json<ActivityPayload>,
) -> ApiResult {
    let detail = activity_service::update_activity(&pool, &activity_id, payload)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(detail)))
}

pub async fn delete_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    activity_service::delete_activity(&pool, &activity_id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(null)))
}

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub action: String, // join|leave
    pub subject_user_id: Option<String>,
    pub subject_name: Option<String>,
    pub role: Option<String>,
}

pub async fn signup_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<SignupBody>,
) -> ApiResult {
    if body.action != "join" && body.action != "leave" {
        return Err(fail(StatusCode::BAD_REQUEST, "unknown_action"));
    }

    let subject = body.subject_user_id.as_deref().unwrap_or(&auth_user.id);
    let subject_name = if subject == auth_user.id {
        body.subject_name.as_deref().or(auth_user.name.as_deref())
    } else {
        body.subject_name.as_deref()
    };

    activity_service::signup(
        &pool,
        &auth_user.id,
        &activity_id,
        subject,
        subject_name,
        &body.action,
        body.role.as_deref(),
    )
    .await
    .map_err(map_error)?;

    let detail = activity_service::load_detail(&pool, &activity_id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(detail)))
}

fn map_error(e: ActivityError) -> (StatusCode, Json<serde_json::Value>) {
    match e {
        ActivityError::NotFound => fail(StatusCode::NOT_FOUND, "not_found"),
        ActivityError::Cancelled => fail(StatusCode::CONFLICT, "activity_cancelled"),
        ActivityError::Validation(msg) => {
            warn!("Activity payload rejected: {}", msg);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": "validation_failed", "detail": msg })),
            )
        }
        ActivityError::Db(e) => {
            warn!("Activity query failed: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}
