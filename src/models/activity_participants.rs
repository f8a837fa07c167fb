#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityParticipantRow {
    pub id: String,
    pub activity_id: String,
    pub user_id: String,
    pub name: Option<String>,
    pub role: String,
    pub joined_at: String,
    pub is_deleted: i64,
}
