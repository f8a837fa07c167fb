use sqlx::SqlitePool;

use crate::models::NotificationRow;

const SQL_INSERT_NOTIFICATION: &str = r#"
INSERT INTO notifications (
  id,
  recipient_user_id,
  kind,
  body,
  link,
  created_at
) VALUES (?, ?, ?, ?, ?, ?)
"#;

pub struct NewNotification<'a> {
    pub id: &'a str,
    /// None means the notification is addressed to every admin.
    pub recipient_user_id: Option<&'a str>,
    pub kind: &'a str,
    pub body: &'a str,
    pub link: Option<&'a str>,
    pub now: &'a str,
}

pub async fn insert_notification(
    pool: &SqlitePool,
    new: NewNotification<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_NOTIFICATION)
        .bind(new.id)
        .bind(new.recipient_user_id)
        .bind(new.kind)
        .bind(new.body)
        .bind(new.link)
        .bind(new.now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_NOTIFICATIONS: &str = r#"
SELECT
  id,
  recipient_user_id,
  kind,
  body,
  link,
  is_read,
  created_at
FROM notifications
WHERE (recipient_user_id = ? OR recipient_user_id IS NULL)
ORDER BY created_at DESC
LIMIT ?
"#;

const SQL_LIST_UNREAD_NOTIFICATIONS: &str = r#"
SELECT
  id,
  recipient_user_id,
  kind,
  body,
  link,
  is_read,
  created_at
FROM notifications
WHERE (recipient_user_id = ? OR recipient_user_id IS NULL)
  AND is_read = 0
ORDER BY created_at DESC
LIMIT ?
"#;

pub async fn list_notifications(
    pool: &SqlitePool,
    user_id: &str,
    unread_only: bool,
    limit: i64,
) -> sqlx::Result<Vec<NotificationRow>> {
    let sql = if unread_only {
        SQL_LIST_UNREAD_NOTIFICATIONS
    } else {
        SQL_LIST_NOTIFICATIONS
    };
    sqlx::query_as::<_, NotificationRow>(sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

const SQL_COUNT_UNREAD: &str = r#"
SELECT COUNT(*)
FROM notifications
WHERE (recipient_user_id = ? OR recipient_user_id IS NULL)
  AND is_read = 0
"#;

pub async fn count_unread(pool: &SqlitePool, user_id: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_UNREAD)
        .bind(user_id)
        .fetch_one(pool)
        .await
}

const SQL_MARK_READ: &str = r#"
UPDATE notifications
SET is_read = 1
WHERE id = ?
  AND (recipient_user_id = ? OR recipient_user_id IS NULL)
  AND is_read = 0
"#;

pub async fn mark_read(pool: &SqlitePool, id: &str, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_READ)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_MARK_ALL_READ: &str = r#"
UPDATE notifications
SET is_read = 1
WHERE (recipient_user_id = ? OR recipient_user_id IS NULL)
  AND is_read = 0
"#;

pub async fn mark_all_read(pool: &SqlitePool, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_ALL_READ)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
