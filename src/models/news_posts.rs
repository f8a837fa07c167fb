#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NewsPostRow {
    pub post_id: String,
    pub title: String,
    pub content: String,
    pub image_urls: Option<String>,
    pub pdf_url: Option<String>,
    pub author_user_id: String,
    pub author_name: Option<String>,
    pub like_count: i64,
    pub liked_by: Option<String>,
    pub comment_count: i64,
    pub created_at: String,
    pub updated_at: String,
    pub is_deleted: i64,
}
