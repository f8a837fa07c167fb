use sqlx::SqlitePool;

use crate::models::NewsPostRow;

const SQL_LIST_POSTS: &str = r#"
SELECT
  post_id,
  title,
  content,
  image_urls,
  pdf_url,
  author_user_id,
  author_name,
  like_count,
  liked_by,
  comment_count,
  created_at,
  updated_at,
  is_deleted
FROM news_posts
WHERE is_deleted = 0
ORDER BY created_at DESC
LIMIT ? OFFSET ?
"#;

pub async fn list_posts(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<NewsPostRow>> {
    sqlx::query_as::<_, NewsPostRow>(SQL_LIST_POSTS)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

const SQL_COUNT_POSTS: &str = r#"
SELECT COUNT(*)
FROM news_posts
WHERE is_deleted = 0
"#;

pub async fn count_posts(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_POSTS)
        .fetch_one(pool)
        .await
}

const SQL_LOAD_POST: &str = r#"
SELECT
  post_id,
  title,
  content,
  image_urls,
  pdf_url,
  author_user_id,
  author_name,
  like_count,
  liked_by,
  comment_count,
  created_at,
  updated_at,
  is_deleted
FROM news_posts
WHERE post_id = ?
  AND is_deleted = 0
"#;

pub async fn load_post_by_id(
    pool: &SqlitePool,
    post_id: &str,
) -> sqlx::Result<Option<NewsPostRow>> {
    sqlx::query_as::<_, NewsPostRow>(SQL_LOAD_POST)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_POST: &str = r#"
INSERT INTO news_posts (
  post_id,
  title,
  content,
  image_urls,
  pdf_url,
  author_user_id,
  author_name,
  liked_by,
  created_at,
  updated_at
) VALUES (?, ?, ?, ?, ?, ?, ?, '[]', ?, ?)
"#;

pub struct NewNewsPost<'a> {
    pub post_id: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub image_urls_json: Option<&'a str>,
    pub pdf_url: Option<&'a str>,
    pub author_user_id: &'a str,
    pub author_name: Option<&'a str>,
    pub now: &'a str,
}

pub async fn insert_post(pool: &SqlitePool, new: NewNewsPost<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_POST)
        .bind(new.post_id)
        .bind(new.title)
        .bind(new.content)
        .bind(new.image_urls_json)
        .bind(new.pdf_url)
        .bind(new.author_user_id)
        .bind(new.author_name)
        .bind(new.now)
        .bind(new.now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_POST: &str = r#"
UPDATE news_posts
SET title = ?,
    content = ?,
    image_urls = ?,
    pdf_url = ?,
    updated_at = ?
WHERE post_id = ?
  AND is_deleted = 0
"#;

pub async fn update_post(
    pool: &SqlitePool,
    post_id: &str,
    title: &str,
    content: &str,
    image_urls_json: Option<&str>,
    pdf_url: Option<&str>,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_POST)
        .bind(title)
        .bind(content)
        .bind(image_urls_json)
        .bind(pdf_url)
        .bind(now)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_POST_LIKES: &str = r#"
UPDATE news_posts
SET like_count = ?,
    liked_by = ?,
    updated_at = ?
WHERE post_id = ?
  AND is_deleted = 0
"#;

pub async fn update_post_likes(
    pool: &SqlitePool,
    post_id: &str,
    like_count: i64,
    liked_by_json: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_POST_LIKES)
        .bind(like_count)
        .bind(liked_by_json)
        .bind(now)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SET_COMMENT_COUNT: &str = r#"
UPDATE news_posts
SET comment_count = ?,
    updated_at = ?
WHERE post_id = ?
  AND is_deleted = 0
"#;

pub async fn set_comment_count(
    pool: &SqlitePool,
    post_id: &str,
    comment_count: i64,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_COMMENT_COUNT)
        .bind(comment_count)
        .bind(now)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SOFT_DELETE_POST: &str = r#"
UPDATE news_posts
SET is_deleted = 1,
    updated_at = ?
WHERE post_id = ?
  AND is_deleted = 0
"#;

pub async fn soft_delete_post(pool: &SqlitePool, post_id: &str, now: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SOFT_DELETE_POST)
        .bind(now)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
