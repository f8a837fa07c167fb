use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::news_service::{self, NewsError, NewsPostPayload};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::{fail, ok, ApiResult};

#[derive(Debug, Deserialize, Default)]
pub struct FeedQuery {
    page: Option<u64>,
    per_page: Option<u64>,
}

pub async fn feed_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<FeedQuery>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let feed = news_service::list_posts(
        &pool,
        &auth_user.id,
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(20),
    )
    .await
    .map_err(map_error)?;
    Ok(ok(json!(feed)))
}

pub async fn create_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(payload): Json<NewsPostPayload>,
) -> ApiResult {
    let post_id = news_service::create_post(
        &pool,
        &auth_user.id,
        auth_user.name.as_deref(),
        payload,
    )
    .await
    .map_err(map_error)?;
    Ok(ok(json!({ "post_id": post_id })))
}

pub async fn detail_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let post = news_service::load_post(&pool, &post_id, &auth_user.id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(post)))
}

pub async fn update_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(payload): Json<NewsPostPayload>,
) -> ApiResult {
    let post = news_service::update_post(&pool, &post_id, &auth_user.id, payload)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(post)))
}

pub async fn delete_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    news_service::delete_post(&pool, &post_id, &auth_user.id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(null)))
}

pub async fn like_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let result = news_service::toggle_post_like(&pool, &post_id, &auth_user.id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(result)))
}

pub async fn list_comments_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let comments = news_service::list_comments(&pool, &post_id, &auth_user.id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!({ "comments": comments })))
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub content: String,
    pub parent_comment_id: Option<String>,
    pub image_url: Option<String>,
}

pub async fn add_comment_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<CommentBody>,
) -> ApiResult {
    let comment_id = news_service::add_comment(
        &pool,
        &post_id,
        &auth_user.id,
        auth_user.name.as_deref(),
        &body.content,
        body.parent_comment_id.as_deref(),
        body.image_url.as_deref(),
    )
    .await
    .map_err(map_error)?;
    Ok(ok(json!({ "comment_id": comment_id })))
}

pub async fn like_comment_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(comment_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    let result = news_service::toggle_comment_like(&pool, &comment_id, &auth_user.id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(result)))
}

pub async fn delete_comment_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(comment_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> ApiResult {
    news_service::delete_comment(&pool, &comment_id, &auth_user.id)
        .await
        .map_err(map_error)?;
    Ok(ok(json!(null)))
}

fn map_error(e: NewsError) -> (StatusCode, Json<serde_json::Value>) {
    match e {
        NewsError::PostNotFound => fail(StatusCode::NOT_FOUND, "post_not_found"),
        NewsError::CommentNotFound => fail(StatusCode::NOT_FOUND, "comment_not_found"),
        NewsError::NotAuthor => fail(StatusCode::FORBIDDEN, "not_author"),
        NewsError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "validation_failed", "detail": msg })),
        ),
        NewsError::Db(e) => {
            warn!("News query failed: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}
