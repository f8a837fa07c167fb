use sqlx::SqlitePool;

use crate::models::ActivityParticipantRow;

const SQL_LIST_PARTICIPANTS: &str = r#"
SELECT
  id,
  activity_id,
  user_id,
  name,
  role,
  joined_at,
  is_deleted
FROM activity_participants
WHERE activity_id = ?
  AND is_deleted = 0
ORDER BY joined_at ASC
"#;

pub async fn list_participants(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Vec<ActivityParticipantRow>> {
    sqlx::query_as::<_, ActivityParticipantRow>(SQL_LIST_PARTICIPANTS)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}

// Re-joining revives the existing row instead of inserting a duplicate, so
// join stays idempotent per (activity, user).
const SQL_UPSERT_PARTICIPANT: &str = r#"
INSERT INTO activity_participants (
  id,
  activity_id,
  user_id,
  name,
  role,
  joined_at
) VALUES (?, ?, ?, ?, ?, ?)
ON CONFLICT (activity_id, user_id) DO UPDATE
SET role = excluded.role,
    name = excluded.name,
    is_deleted = 0
"#;

pub struct NewParticipant<'a> {
    pub id: &'a str,
    pub activity_id: &'a str,
    pub user_id: &'a str,
    pub name: Option<&'a str>,
    pub role: &'a str,
    pub joined_at: &'a str,
}

pub async fn upsert_participant(
    pool: &SqlitePool,
    new: NewParticipant<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_PARTICIPANT)
        .bind(new.id)
        .bind(new.activity_id)
        .bind(new.user_id)
        .bind(new.name)
        .bind(new.role)
        .bind(new.joined_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LEAVE_PARTICIPANT: &str = r#"
UPDATE activity_participants
SET is_deleted = 1
WHERE activity_id = ?
  AND user_id = ?
  AND is_deleted = 0
"#;

pub async fn leave_participant(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_LEAVE_PARTICIPANT)
        .bind(activity_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_PARTICIPANT_USER_IDS: &str = r#"
SELECT user_id
FROM activity_participants
WHERE activity_id = ?
  AND is_deleted = 0
"#;

pub async fn list_participant_user_ids(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(SQL_LIST_PARTICIPANT_USER_IDS)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}
