use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::notification_repo;
use crate::models::NotificationRow;

const LIST_LIMIT: i64 = 30;

#[derive(Serialize)]
pub struct NotificationView {
    pub id: String,
    pub kind: String,
    pub body: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct NotificationsView {
    pub unread_count: i64,
    pub notifications: Vec<NotificationView>,
}

/// What the sidebar polls.
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    unread_only: bool,
) -> sqlx::Result<NotificationsView> {
    let rows = notification_repo::list_notifications(pool, user_id, unread_only, LIST_LIMIT).await?;
    let unread_count = notification_repo::count_unread(pool, user_id).await?;
    Ok(NotificationsView {
        unread_count,
        notifications: rows.into_iter().map(build_view).collect(),
    })
}

pub async fn mark_read(pool: &SqlitePool, id: &str, user_id: &str) -> sqlx::Result<u64> {
    notification_repo::mark_read(pool, id, user_id).await
}

pub async fn mark_all_read(pool: &SqlitePool, user_id: &str) -> sqlx::Result<u64> {
    notification_repo::mark_all_read(pool, user_id).await
}

/// Broadcast to the admins (recipient NULL), they all review applications.
pub async fn notify_membership_applied(
    pool: &SqlitePool,
    applicant_name: &str,
    membership_id: &str,
) -> sqlx::Result<()> {
    insert(
        pool,
        None,
        "membership_applied",
        &format!("{} heeft een lidmaatschap aangevraagd", applicant_name),
        Some(&format!("/api/memberships/{}", membership_id)),
    )
    .await
}

pub async fn notify_comment_added(
    pool: &SqlitePool,
    post_author_user_id: &str,
    commenter_name: &str,
    post_title: &str,
    post_id: &str,
) -> sqlx::Result<()> {
    insert(
        pool,
        Some(post_author_user_id),
        "comment_added",
        &format!("{} reageerde op '{}'", commenter_name, post_title),
        Some(&format!("/api/news/{}", post_id)),
    )
    .await
}

pub async fn notify_activity_cancelled(
    pool: &SqlitePool,
    activity_title: &str,
    activity_id: &str,
    participant_user_ids: &[String],
) -> sqlx::Result<()> {
    for user_id in participant_user_ids {
        insert(
            pool,
            Some(user_id),
            "activity_cancelled",
            &format!("Activiteit '{}' is geannuleerd", activity_title),
            Some(&format!("/api/activities/{}", activity_id)),
        )
        .await?;
    }
    Ok(())
}

async fn insert(
    pool: &SqlitePool,
    recipient_user_id: Option<&str>,
    kind: &str,
    body: &str,
    link: Option<&str>,
) -> sqlx::Result<()> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    notification_repo::insert_notification(
        pool,
        notification_repo::NewNotification {
            id: &id,
            recipient_user_id,
            kind,
            body,
            link,
            now: &now,
        },
    )
    .await?;
    Ok(())
}

fn build_view(row: NotificationRow) -> NotificationView {
    NotificationView {
        id: row.id,
        kind: row.kind,
        body: row.body,
        link: row.link,
        is_read: row.is_read == 1,
        created_at: row.created_at,
    }
}
