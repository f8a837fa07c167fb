#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    pub activity_id: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: String,
    pub time_slots: String,
    pub location_mode: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub visibility: String,
    pub status: String,
    pub main_image_url: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_deleted: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityFeedRow {
    pub activity_id: String,
    pub title: String,
    pub scheduled_date: String,
    pub status: String,
    pub visibility: String,
    pub main_image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub participant_count: i64,
    pub organizer_name: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityGeoCandidateRow {
    pub activity_id: String,
    pub title: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
