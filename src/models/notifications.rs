#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    pub id: String,
    pub recipient_user_id: Option<String>,
    pub kind: String,
    pub body: String,
    pub link: Option<String>,
    pub is_read: i64,
    pub created_at: String,
}
