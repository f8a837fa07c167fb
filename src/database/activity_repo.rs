use sqlx::SqlitePool;

use crate::models::activities::ActivityGeoCandidateRow;
use crate::models::{ActivityFeedRow, ActivityRow};

const SQL_LIST_UPCOMING: &str = r#"
SELECT
  a.activity_id,
  a.title,
  a.scheduled_date,
  a.status,
  a.visibility,
  a.main_image_url,
  a.latitude,
  a.longitude,
  (
    SELECT COUNT(*)
    FROM activity_participants ap
    WHERE ap.activity_id = a.activity_id
      AND ap.is_deleted = 0
  ) AS participant_count,
  (
    SELECT ap.name
    FROM activity_participants ap
    WHERE ap.activity_id = a.activity_id
      AND ap.is_deleted = 0
      AND ap.role = 'organizer'
    ORDER BY ap.joined_at ASC
    LIMIT 1
  ) AS organizer_name
FROM activities a
WHERE a.is_deleted = 0
  AND a.scheduled_date >= ?
ORDER BY a.scheduled_date ASC
"#;

const SQL_LIST_PAST: &str = r#"
SELECT
  a.activity_id,
  a.title,
  a.scheduled_date,
  a.status,
  a.visibility,
  a.main_image_url,
  a.latitude,
  a.longitude,
  (
    SELECT COUNT(*)
    FROM activity_participants ap
    WHERE ap.activity_id = a.activity_id
      AND ap.is_deleted = 0
  ) AS participant_count,
  (
    SELECT ap.name
    FROM activity_participants ap
    WHERE ap.activity_id = a.activity_id
      AND ap.is_deleted = 0
      AND ap.role = 'organizer'
    ORDER BY ap.joined_at ASC
    LIMIT 1
  ) AS organizer_name
FROM activities a
WHERE a.is_deleted = 0
  AND a.scheduled_date < ?
ORDER BY a.scheduled_date DESC
"#;

pub async fn list_activities(
    pool: &SqlitePool,
    today: &str,
    past: bool,
) -> sqlx::Result<Vec<ActivityFeedRow>> {
    let sql = if past { SQL_LIST_PAST } else { SQL_LIST_UPCOMING };
    sqlx::query_as::<_, ActivityFeedRow>(sql)
        .bind(today)
        .fetch_all(pool)
        .await
}

const SQL_LOAD_ACTIVITY: &str = r#"
SELECT
  activity_id,
  title,
  description,
  scheduled_date,
  time_slots,
  location_mode,
  location,
  latitude,
  longitude,
  visibility,
  status,
  main_image_url,
  created_by,
  created_at,
  updated_at,
  is_deleted
FROM activities
WHERE activity_id = ?
  AND is_deleted = 0
"#;

pub async fn load_activity_by_id(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Option<ActivityRow>> {
    sqlx::query_as::<_, ActivityRow>(SQL_LOAD_ACTIVITY)
        .bind(activity_id)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activities (
  activity_id,
  title,
  description,
  scheduled_date,
  time_slots,
  location_mode,
  location,
  latitude,
  longitude,
  visibility,
  status,
  main_image_url,
  created_by,
  created_at,
  updated_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub struct NewActivity<'a> {
    pub activity_id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub scheduled_date: &'a str,
    pub time_slots_json: &'a str,
    pub location_mode: &'a str,
    pub location_json: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub visibility: &'a str,
    pub status: &'a str,
    pub main_image_url: Option<&'a str>,
    pub created_by: &'a str,
    pub now: &'a str,
}

pub async fn insert_activity(pool: &SqlitePool, new: NewActivity<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(new.activity_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.scheduled_date)
        .bind(new.time_slots_json)
        .bind(new.location_mode)
        .bind(new.location_json)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.visibility)
        .bind(new.status)
        .bind(new.main_image_url)
        .bind(new.created_by)
        .bind(new.now)
        .bind(new.now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_ACTIVITY: &str = r#"
UPDATE activities
SET title = ?,
    description = ?,
    scheduled_date = ?,
    time_slots = ?,
    location_mode = ?,
    location = ?,
    latitude = ?,
    longitude = ?,
    visibility = ?,
    status = ?,
    main_image_url = ?,
    updated_at = ?
WHERE activity_id = ?
  AND is_deleted = 0
"#;

pub struct ActivityUpdate<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub scheduled_date: &'a str,
    pub time_slots_json: &'a str,
    pub location_mode: &'a str,
    pub location_json: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub visibility: &'a str,
    pub status: &'a str,
    pub main_image_url: Option<&'a str>,
    pub now: &'a str,
}

pub async fn update_activity(
    pool: &SqlitePool,
    activity_id: &str,
    upd: ActivityUpdate<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_ACTIVITY)
        .bind(upd.title)
        .bind(upd.description)
        .bind(upd.scheduled_date)
        .bind(upd.time_slots_json)
        .bind(upd.location_mode)
        .bind(upd.location_json)
        .bind(upd.latitude)
        .bind(upd.longitude)
        .bind(upd.visibility)
        .bind(upd.status)
        .bind(upd.main_image_url)
        .bind(upd.now)
        .bind(activity_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SOFT_DELETE_ACTIVITY: &str = r#"
UPDATE activities
SET is_deleted = 1,
    updated_at = ?
WHERE activity_id = ?
  AND is_deleted = 0
"#;

pub async fn soft_delete_activity(
    pool: &SqlitePool,
    activity_id: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SOFT_DELETE_ACTIVITY)
        .bind(now)
        .bind(activity_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_ACTIVITIES_MISSING_GEO: &str = r#"
SELECT
  activity_id,
  title,
  location,
  latitude,
  longitude
FROM activities
WHERE is_deleted = 0
  AND (latitude IS NULL OR longitude IS NULL)
  AND location IS NOT NULL
  AND location != ''
ORDER BY scheduled_date ASC
LIMIT ?
"#;

pub async fn list_activities_missing_geo(
    pool: &SqlitePool,
    limit: i64,
) -> sqlx::Result<Vec<ActivityGeoCandidateRow>> {
    sqlx::query_as::<_, ActivityGeoCandidateRow>(SQL_LIST_ACTIVITIES_MISSING_GEO)
        .bind(limit)
        .fetch_all(pool)
        .await
}

const SQL_UPDATE_ACTIVITY_GEO: &str = r#"
UPDATE activities
SET latitude = ?, longitude = ?
WHERE activity_id = ?
"#;

pub async fn update_activity_geo(
    pool: &SqlitePool,
    activity_id: &str,
    latitude: f64,
    longitude: f64,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_ACTIVITY_GEO)
        .bind(latitude)
        .bind(longitude)
        .bind(activity_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
