use sqlx::SqlitePool;

use crate::models::CommentRow;

const SQL_LIST_COMMENTS: &str = r#"
SELECT
  comment_id,
  post_id,
  parent_comment_id,
  author_user_id,
  author_name,
  content,
  image_url,
  like_count,
  liked_by,
  created_at,
  is_deleted
FROM news_comments
WHERE post_id = ?
  AND is_deleted = 0
ORDER BY created_at ASC
"#;

pub async fn list_comments_by_post(
    pool: &SqlitePool,
    post_id: &str,
) -> sqlx::Result<Vec<CommentRow>> {
    sqlx::query_as::<_, CommentRow>(SQL_LIST_COMMENTS)
        .bind(post_id)
        .fetch_all(pool)
        .await
}

const SQL_LOAD_COMMENT: &str = r#"
SELECT
  comment_id,
  post_id,
  parent_comment_id,
  author_user_id,
  author_name,
  content,
  image_url,
  like_count,
  liked_by,
  created_at,
  is_deleted
FROM news_comments
WHERE comment_id = ?
  AND is_deleted = 0
"#;

pub async fn load_comment_by_id(
    pool: &SqlitePool,
    comment_id: &str,
) -> sqlx::Result<Option<CommentRow>> {
    sqlx::query_as::<_, CommentRow>(SQL_LOAD_COMMENT)
        .bind(comment_id)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_COMMENT: &str = r#"
INSERT INTO news_comments (
  comment_id,
  post_id,
  parent_comment_id,
  author_user_id,
  author_name,
  content,
  image_url,
  liked_by,
  created_at
) VALUES (?, ?, ?, ?, ?, ?, ?, '[]', ?)
"#;

pub struct NewComment<'a> {
    pub comment_id: &'a str,
    pub post_id: &'a str,
    pub parent_comment_id: Option<&'a str>,
    pub author_user_id: &'a str,
    pub author_name: Option<&'a str>,
    pub content: &'a str,
    pub image_url: Option<&'a str>,
    pub now: &'a str,
}

pub async fn insert_comment(pool: &SqlitePool, new: NewComment<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_COMMENT)
        .bind(new.comment_id)
        .bind(new.post_id)
        .bind(new.parent_comment_id)
        .bind(new.author_user_id)
        .bind(new.author_name)
        .bind(new.content)
        .bind(new.image_url)
        .bind(new.now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_COMMENT_LIKES: &str = r#"
UPDATE news_comments
SET like_count = ?,
    liked_by = ?
WHERE comment_id = ?
  AND is_deleted = 0
"#;

pub async fn update_comment_likes(
    pool: &SqlitePool,
    comment_id: &str,
    like_count: i64,
    liked_by_json: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_COMMENT_LIKES)
        .bind(like_count)
        .bind(liked_by_json)
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

// Deleting a top-level comment takes its replies with it.
const SQL_SOFT_DELETE_COMMENT: &str = r#"
UPDATE news_comments
SET is_deleted = 1
WHERE (comment_id = ? OR parent_comment_id = ?)
  AND is_deleted = 0
"#;

pub async fn soft_delete_comment_with_replies(
    pool: &SqlitePool,
    comment_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SOFT_DELETE_COMMENT)
        .bind(comment_id)
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_COUNT_LIVE_COMMENTS: &str = r#"
SELECT COUNT(*)
FROM news_comments
WHERE post_id = ?
  AND is_deleted = 0
"#;

pub async fn count_live_comments(pool: &SqlitePool, post_id: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_LIVE_COMMENTS)
        .bind(post_id)
        .fetch_one(pool)
        .await
}
