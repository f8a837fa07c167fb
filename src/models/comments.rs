#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub comment_id: String,
    pub post_id: String,
    pub parent_comment_id: Option<String>,
    pub author_user_id: String,
    pub author_name: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub like_count: i64,
    pub liked_by: Option<String>,
    pub created_at: String,
    pub is_deleted: i64,
}
