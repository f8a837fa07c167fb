use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::{comment_repo, news_repo};
use crate::models::{CommentRow, NewsPostRow};
use crate::services::notification_service;

const MAX_IMAGES_PER_POST: usize = 9;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("post not found")]
    PostNotFound,
    #[error("comment not found")]
    CommentNotFound,
    #[error("only the author may do this")]
    NotAuthor,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Deserialize)]
pub struct NewsPostPayload {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub pdf_url: Option<String>,
}

#[derive(Serialize)]
pub struct NewsPostView {
    pub post_id: String,
    pub title: String,
    pub content: String,
    pub image_urls: Vec<String>,
    pub pdf_url: Option<String>,
    pub author_user_id: String,
    pub author_name: Option<String>,
    pub like_count: i64,
    pub liked_by_me: bool,
    pub comment_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct NewsFeedView {
    pub posts: Vec<NewsPostView>,
    pub page: u64,
    pub per_page: u64,
    pub total: i64,
}

#[derive(Serialize)]
pub struct CommentView {
    pub comment_id: String,
    pub parent_comment_id: Option<String>,
    pub author_user_id: String,
    pub author_name: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub like_count: i64,
    pub liked_by_me: bool,
    pub created_at: String,
    pub replies: Vec<CommentView>,
}

#[derive(Serialize)]
pub struct LikeResultView {
    pub liked: bool,
    pub like_count: i64,
}

pub async fn list_posts(
    pool: &SqlitePool,
    me: &str,
    page: u64,
    per_page: u64,
) -> Result<NewsFeedView, NewsError> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 50);
    let offset = ((page - 1) * per_page) as i64;

    let rows = news_repo::list_posts(pool, per_page as i64, offset).await?;
    let total = news_repo::count_posts(pool).await?;

    Ok(NewsFeedView {
        posts: rows.into_iter().map(|r| build_post_view(r, me)).collect(),
        page,
        per_page,
        total,
    })
}

pub async fn create_post(
    pool: &SqlitePool,
    author_user_id: &str,
    author_name: Option<&str>,
    payload: NewsPostPayload,
) -> Result<String, NewsError> {
    validate_post(&payload).map_err(NewsError::Validation)?;

    let post_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let image_urls_json = if payload.image_urls.is_empty() {
        None
    } else {
        serde_json::to_string(&payload.image_urls).ok()
    };

    news_repo::insert_post(
        pool,
        news_repo::NewNewsPost {
            post_id: &post_id,
            title: payload.title.trim(),
            content: &payload.content,
            image_urls_json: image_urls_json.as_deref(),
            pdf_url: payload.pdf_url.as_deref(),
            author_user_id,
            author_name,
            now: &now,
        },
    )
    .await?;

    Ok(post_id)
}

pub async fn load_post(
    pool: &SqlitePool,
    post_id: &str,
    me: &str,
) -> Result<NewsPostView, NewsError> {
    let row = news_repo::load_post_by_id(pool, post_id)
        .await?
        .ok_or(NewsError::PostNotFound)?;
    Ok(build_post_view(row, me))
}

pub async fn update_post(
    pool: &SqlitePool,
    post_id: &str,
    editor_user_id: &str,
    payload: NewsPostPayload,
) -> Result<NewsPostView, NewsError> {
    let row = news_repo::load_post_by_id(pool, post_id)
        .await?
        .ok_or(NewsError::PostNotFound)?;
    if row.author_user_id != editor_user_id {
        return Err(NewsError::NotAuthor);
    }
    validate_post(&payload).map_err(NewsError::Validation)?;

    let now = Utc::now().to_rfc3339();
    let image_urls_json = if payload.image_urls.is_empty() {
        None
    } else {
        serde_json::to_string(&payload.image_urls).ok()
    };
    news_repo::update_post(
        pool,
        post_id,
        payload.title.trim(),
        &payload.content,
        image_urls_json.as_deref(),
        payload.pdf_url.as_deref(),
        &now,
    )
    .await?;

    load_post(pool, post_id, editor_user_id).await
}

pub async fn delete_post(
    pool: &SqlitePool,
    post_id: &str,
    actor_user_id: &str,
) -> Result<(), NewsError> {
    let row = news_repo::load_post_by_id(pool, post_id)
        .await?
        .ok_or(NewsError::PostNotFound)?;
    if row.author_user_id != actor_user_id {
        return Err(NewsError::NotAuthor);
    }
    let now = Utc::now().to_rfc3339();
    news_repo::soft_delete_post(pool, post_id, &now).await?;
    Ok(())
}

pub async fn toggle_post_like(
    pool: &SqlitePool,
    post_id: &str,
    user_id: &str,
) -> Result<LikeResultView, NewsError> {
    let row = news_repo::load_post_by_id(pool, post_id)
        .await?
        .ok_or(NewsError::PostNotFound)?;

    let (liked_by, liked) = toggle_like(row.liked_by.as_deref(), user_id);
    let like_count = liked_by.len() as i64;
    let liked_by_json = serde_json::to_string(&liked_by).unwrap_or_else(|_| "[]".to_string());
    let now = Utc::now().to_rfc3339();

    news_repo::update_post_likes(pool, post_id, like_count, &liked_by_json, &now).await?;
    Ok(LikeResultView { liked, like_count })
}

pub async fn list_comments(
    pool: &SqlitePool,
    post_id: &str,
    me: &str,
) -> Result<Vec<CommentView>, NewsError> {
    if news_repo::load_post_by_id(pool, post_id).await?.is_none() {
        return Err(NewsError::PostNotFound);
    }
    let rows = comment_repo::list_comments_by_post(pool, post_id).await?;
    Ok(build_comment_tree(rows, me))
}

pub async fn add_comment(
    pool: &SqlitePool,
    post_id: &str,
    author_user_id: &str,
    author_name: Option<&str>,
    content: &str,
    parent_comment_id: Option<&str>,
    image_url: Option<&str>,
) -> Result<String, NewsError> {
    let post = news_repo::load_post_by_id(pool, post_id)
        .await?
        .ok_or(NewsError::PostNotFound)?;
    if content.trim().is_empty() {
        return Err(NewsError::Validation("comment content is required".to_string()));
    }

    // Replies to replies hang off the root comment, the feed only nests one
    // level deep.
    let parent = match parent_comment_id {
        Some(parent_id) => {
            let parent = comment_repo::load_comment_by_id(pool, parent_id)
                .await?
                .ok_or(NewsError::CommentNotFound)?;
            if parent.post_id != post_id {
                return Err(NewsError::CommentNotFound);
            }
            Some(parent.parent_comment_id.unwrap_or(parent.comment_id))
        }
        None => None,
    };

    let comment_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    comment_repo::insert_comment(
        pool,
        comment_repo::NewComment {
            comment_id: &comment_id,
            post_id,
            parent_comment_id: parent.as_deref(),
            author_user_id,
            author_name,
            content: content.trim(),
            image_url,
            now: &now,
        },
    )
    .await?;

    let live = comment_repo::count_live_comments(pool, post_id).await?;
    news_repo::set_comment_count(pool, post_id, live, &now).await?;

    if post.author_user_id != author_user_id {
        notification_service::notify_comment_added(
            pool,
            &post.author_user_id,
            author_name.unwrap_or("Onbekend"),
            &post.title,
            post_id,
        )
        .await?;
    }

    Ok(comment_id)
}

pub async fn toggle_comment_like(
    pool: &SqlitePool,
    comment_id: &str,
    user_id: &str,
) -> Result<LikeResultView, NewsError> {
    let row = comment_repo::load_comment_by_id(pool, comment_id)
        .await?
        .ok_or(NewsError::CommentNotFound)?;

    let (liked_by, liked) = toggle_like(row.liked_by.as_deref(), user_id);
    let like_count = liked_by.len() as i64;
    let liked_by_json = serde_json::to_string(&liked_by).unwrap_or_else(|_| "[]".to_string());

    comment_repo::update_comment_likes(pool, comment_id, like_count, &liked_by_json).await?;
    Ok(LikeResultView { liked, like_count })
}

pub async fn delete_comment(
    pool: &SqlitePool,
    comment_id: &str,
    actor_user_id: &str,
) -> Result<(), NewsError> {
    let row = comment_repo::load_comment_by_id(pool, comment_id)
        .await?
        .ok_or(NewsError::CommentNotFound)?;
    if row.author_user_id != actor_user_id {
        return Err(NewsError::NotAuthor);
    }

    comment_repo::soft_delete_comment_with_replies(pool, comment_id).await?;

    let now = Utc::now().to_rfc3339();
    let live = comment_repo::count_live_comments(pool, &row.post_id).await?;
    news_repo::set_comment_count(pool, &row.post_id, live, &now).await?;
    Ok(())
}

fn build_post_view(row: NewsPostRow, me: &str) -> NewsPostView {
    let liked_by = parse_string_array_json(row.liked_by.as_deref());
    NewsPostView {
        post_id: row.post_id,
        title: row.title,
        content: row.content,
        image_urls: parse_string_array_json(row.image_urls.as_deref()),
        pdf_url: row.pdf_url,
        author_user_id: row.author_user_id,
        author_name: row.author_name,
        like_count: row.like_count,
        liked_by_me: liked_by.iter().any(|u| u == me),
        comment_count: row.comment_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Rows come in oldest-first; top-level comments keep that order and replies
/// land under their root in arrival order.
pub fn build_comment_tree(rows: Vec<CommentRow>, me: &str) -> Vec<CommentView> {
    let mut top_level: Vec<CommentView> = Vec::new();
    let mut replies: Vec<(String, CommentView)> = Vec::new();

    for row in rows {
        let parent = row.parent_comment_id.clone();
        let view = build_comment_view(row, me);
        match parent {
            Some(parent_id) => replies.push((parent_id, view)),
            None => top_level.push(view),
        }
    }

    for (parent_id, reply) in replies {
        if let Some(parent) = top_level.iter_mut().find(|c| c.comment_id == parent_id) {
            parent.replies.push(reply);
        }
        // Replies whose root is gone stay hidden, matching the soft delete of
        // a comment with its replies.
    }

    top_level
}

fn build_comment_view(row: CommentRow, me: &str) -> CommentView {
    let liked_by = parse_string_array_json(row.liked_by.as_deref());
    CommentView {
        comment_id: row.comment_id,
        parent_comment_id: row.parent_comment_id,
        author_user_id: row.author_user_id,
        author_name: row.author_name,
        content: row.content,
        image_url: row.image_url,
        like_count: row.like_count,
        liked_by_me: liked_by.iter().any(|u| u == me),
        created_at: row.created_at,
        replies: Vec::new(),
    }
}

fn parse_string_array_json(json: Option<&str>) -> Vec<String> {
    let Some(raw) = json else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}

/// liked_by acts as a set, so repeated toggles always converge instead of
/// double counting rapid clicks.
pub fn toggle_like(liked_by_json: Option<&str>, user_id: &str) -> (Vec<String>, bool) {
    let mut liked_by = parse_string_array_json(liked_by_json);
    if let Some(pos) = liked_by.iter().position(|u| u == user_id) {
        liked_by.remove(pos);
        (liked_by, false)
    } else {
        liked_by.push(user_id.to_string());
        (liked_by, true)
    }
}

pub fn validate_post(payload: &NewsPostPayload) -> Result<(), String> {
    if payload.title.trim().is_empty() {
        return Err("title is required".to_string());
    }
    if payload.content.trim().is_empty() {
        return Err("content is required".to_string());
    }
    if payload.image_urls.len() > MAX_IMAGES_PER_POST {
        return Err(format!(
            "a post carries at most {} images",
            MAX_IMAGES_PER_POST
        ));
    }
    if let Some(pdf) = payload.pdf_url.as_deref() {
        if !pdf.to_lowercase().ends_with(".pdf") {
            return Err("pdf_url must point to a .pdf file".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{build_comment_tree, toggle_like, validate_post, NewsPostPayload};
    use crate::models::CommentRow;

    fn comment(id: &str, parent: Option<&str>, created_at: &str) -> CommentRow {
        CommentRow {
            comment_id: id.to_string(),
            post_id: "p1".to_string(),
            parent_comment_id: parent.map(|s| s.to_string()),
            author_user_id: "u1".to_string(),
            author_name: Some("Ann".to_string()),
            content: "hoi".to_string(),
            image_url: None,
            like_count: 0,
            liked_by: Some("[\"u2\"]".to_string()),
            created_at: created_at.to_string(),
            is_deleted: 0,
        }
    }

    #[test]
    fn tree_nests_replies_under_root() {
        let rows = vec![
            comment("c1", None, "2026-01-01T10:00:00Z"),
            comment("c2", None, "2026-01-01T11:00:00Z"),
            comment("r1", Some("c1"), "2026-01-01T12:00:00Z"),
            comment("r2", Some("c1"), "2026-01-01T13:00:00Z"),
        ];
        let tree = build_comment_tree(rows, "u1");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment_id, "c1");
        assert_eq!(tree[0].replies.len(), 2);
        assert_eq!(tree[0].replies[0].comment_id, "r1");
        assert_eq!(tree[0].replies[1].comment_id, "r2");
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn tree_hides_orphaned_replies() {
        let rows = vec![comment("r1", Some("gone"), "2026-01-01T12:00:00Z")];
        assert!(build_comment_tree(rows, "u1").is_empty());
    }

    #[test]
    fn tree_marks_liked_by_me() {
        let rows = vec![comment("c1", None, "2026-01-01T10:00:00Z")];
        let tree = build_comment_tree(rows, "u2");
        assert!(tree[0].liked_by_me);
        let rows = vec![comment("c1", None, "2026-01-01T10:00:00Z")];
        let tree = build_comment_tree(rows, "u9");
        assert!(!tree[0].liked_by_me);
    }

    #[test]
    fn toggle_like_adds_then_removes() {
        let (liked_by, liked) = toggle_like(Some("[]"), "u1");
        assert!(liked);
        assert_eq!(liked_by, vec!["u1".to_string()]);

        let json = serde_json::to_string(&liked_by).unwrap();
        let (liked_by, liked) = toggle_like(Some(&json), "u1");
        assert!(!liked);
        assert!(liked_by.is_empty());
    }

    #[test]
    fn toggle_like_tolerates_missing_and_broken_json() {
        let (liked_by, liked) = toggle_like(None, "u1");
        assert!(liked);
        assert_eq!(liked_by.len(), 1);

        let (liked_by, liked) = toggle_like(Some("not json"), "u1");
        assert!(liked);
        assert_eq!(liked_by.len(), 1);
    }

    #[test]
    fn post_validation() {
        let ok = NewsPostPayload {
            title: "Intro".to_string(),
            content: "Welkom".to_string(),
            image_urls: vec![],
            pdf_url: Some("/uploads/a.pdf".to_string()),
        };
        assert!(validate_post(&ok).is_ok());

        let no_title = NewsPostPayload {
            title: "  ".to_string(),
            content: "x".to_string(),
            image_urls: vec![],
            pdf_url: None,
        };
        assert!(validate_post(&no_title).is_err());

        let too_many_images = NewsPostPayload {
            title: "t".to_string(),
            content: "c".to_string(),
            image_urls: (0..10).map(|i| format!("/uploads/{}.png", i)).collect(),
            pdf_url: None,
        };
        assert!(validate_post(&too_many_images).is_err());

        let bad_pdf = NewsPostPayload {
            title: "t".to_string(),
            content: "c".to_string(),
            image_urls: vec![],
            pdf_url: Some("/uploads/a.docx".to_string()),
        };
        assert!(validate_post(&bad_pdf).is_err());
    }
}
