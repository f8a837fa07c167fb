use sqlx::SqlitePool;

use crate::models::MembershipRow;

const SQL_LIST_MEMBERSHIPS: &str = r#"
SELECT
  id,
  user_id,
  user_name,
  user_email,
  status,
  approved_by,
  approved_at,
  removed_by,
  removed_at,
  history,
  created_at,
  updated_at,
  is_deleted
FROM memberships
WHERE is_deleted = 0
ORDER BY created_at DESC
"#;

const SQL_LIST_MEMBERSHIPS_BY_STATUS: &str = r#"
SELECT
  id,
  user_id,
  user_name,
  user_email,
  status,
  approved_by,
  approved_at,
  removed_by,
  removed_at,
  history,
  created_at,
  updated_at,
  is_deleted
FROM memberships
WHERE is_deleted = 0
  AND status = ?
ORDER BY created_at DESC
"#;

pub async fn list_memberships(
    pool: &SqlitePool,
    status: Option<&str>,
) -> sqlx::Result<Vec<MembershipRow>> {
    match status {
        Some(s) => {
            sqlx::query_as::<_, MembershipRow>(SQL_LIST_MEMBERSHIPS_BY_STATUS)
                .bind(s)
                .fetch_all(pool)
                .await
        }
        None => {
            sqlx::query_as::<_, MembershipRow>(SQL_LIST_MEMBERSHIPS)
                .fetch_all(pool)
                .await
        }
    }
}

const SQL_LOAD_MEMBERSHIP: &str = r#"
SELECT
  id,
  user_id,
  user_name,
  user_email,
  status,
  approved_by,
  approved_at,
  removed_by,
  removed_at,
  history,
  created_at,
  updated_at,
  is_deleted
FROM memberships
WHERE id = ?
  AND is_deleted = 0
"#;

pub async fn load_membership_by_id(
    pool: &SqlitePool,
    id: &str,
) -> sqlx::Result<Option<MembershipRow>> {
    sqlx::query_as::<_, MembershipRow>(SQL_LOAD_MEMBERSHIP)
        .bind(id)
        .fetch_optional(pool)
        .await
}

const SQL_COUNT_OPEN_FOR_USER: &str = r#"
SELECT COUNT(*)
FROM memberships
WHERE is_deleted = 0
  AND user_id = ?
  AND status IN ('PENDING', 'ACTIVE')
"#;

pub async fn count_open_memberships_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_OPEN_FOR_USER)
        .bind(user_id)
        .fetch_one(pool)
        .await
}

const SQL_INSERT_MEMBERSHIP: &str = r#"
INSERT INTO memberships (
  id,
  user_id,
  user_name,
  user_email,
  status,
  history,
  created_at,
  updated_at
) VALUES (?, ?, ?, ?, 'PENDING', '[]', ?, ?)
"#;

pub struct NewMembership<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub user_name: &'a str,
    pub user_email: Option<&'a str>,
    pub now: &'a str,
}

pub async fn insert_membership(
    pool: &SqlitePool,
    new: NewMembership<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_MEMBERSHIP)
        .bind(new.id)
        .bind(new.user_id)
        .bind(new.user_name)
        .bind(new.user_email)
        .bind(new.now)
        .bind(new.now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

// Status guards live in the WHERE clause; rows_affected = 0 means the record
// was not in the expected source state.

const SQL_APPROVE_MEMBERSHIP: &str = r#"
UPDATE memberships
SET status = 'ACTIVE',
    approved_by = ?,
    approved_at = ?,
    updated_at = ?
WHERE id = ?
  AND is_deleted = 0
  AND status = 'PENDING'
"#;

pub async fn approve_membership(
    pool: &SqlitePool,
    id: &str,
    approver_user_id: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_APPROVE_MEMBERSHIP)
        .bind(approver_user_id)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_REJECT_MEMBERSHIP: &str = r#"
UPDATE memberships
SET status = 'REJECTED',
    updated_at = ?
WHERE id = ?
  AND is_deleted = 0
  AND status = 'PENDING'
"#;

pub async fn reject_membership(pool: &SqlitePool, id: &str, now: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_REJECT_MEMBERSHIP)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_REMOVE_MEMBERSHIP: &str = r#"
UPDATE memberships
SET status = 'REMOVED',
    removed_by = ?,
    removed_at = ?,
    history = ?,
    updated_at = ?
WHERE id = ?
  AND is_deleted = 0
  AND status = 'ACTIVE'
"#;

pub async fn remove_membership(
    pool: &SqlitePool,
    id: &str,
    remover_user_id: &str,
    history_json: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_REMOVE_MEMBERSHIP)
        .bind(remover_user_id)
        .bind(now)
        .bind(history_json)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_RESTORE_MEMBERSHIP: &str = r#"
UPDATE memberships
SET status = 'ACTIVE',
    removed_by = NULL,
    removed_at = NULL,
    history = ?,
    updated_at = ?
WHERE id = ?
  AND is_deleted = 0
  AND status = 'REMOVED'
"#;

pub async fn restore_membership(
    pool: &SqlitePool,
    id: &str,
    history_json: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_RESTORE_MEMBERSHIP)
        .bind(history_json)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_ACTIVE_USER_IDS: &str = r#"
SELECT user_id
FROM memberships
WHERE is_deleted = 0
  AND status = 'ACTIVE'
"#;

pub async fn list_active_member_user_ids(pool: &SqlitePool) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(SQL_LIST_ACTIVE_USER_IDS)
        .fetch_all(pool)
        .await
}
