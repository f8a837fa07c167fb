#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MembershipRow {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: Option<String>,
    pub status: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
    pub removed_by: Option<String>,
    pub removed_at: Option<String>,
    pub history: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub is_deleted: i64,
}
