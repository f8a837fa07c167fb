use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::membership_repo;
use crate::models::MembershipRow;
use crate::services::notification_service;

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("membership not found")]
    NotFound,
    #[error("user already has an open membership")]
    AlreadyMember,
    #[error("invalid status transition from {0}")]
    InvalidStatus(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: String, // removed|restored
    pub actor_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub at: String,
}

#[derive(Serialize)]
pub struct MembershipView {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: Option<String>,
    pub status: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
    pub removed_by: Option<String>,
    pub removed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct MembershipDetailView {
    #[serde(flatten)]
    pub membership: MembershipView,
    pub history: Vec<HistoryEntry>,
}

pub async fn list_memberships(
    pool: &SqlitePool,
    status: Option<&str>,
) -> Result<Vec<MembershipView>, MembershipError> {
    let rows = membership_repo::list_memberships(pool, status).await?;
    Ok(rows.into_iter().map(build_view).collect())
}

pub async fn create_application(
    pool: &SqlitePool,
    user_id: &str,
    user_name: &str,
    user_email: Option<&str>,
) -> Result<String, MembershipError> {
    let open = membership_repo::count_open_memberships_for_user(pool, user_id).await?;
    if open > 0 {
        return Err(MembershipError::AlreadyMember);
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    membership_repo::insert_membership(
        pool,
        membership_repo::NewMembership {
            id: &id,
            user_id,
            user_name,
            user_email,
            now: &now,
        },
    )
    .await?;

    notification_service::notify_membership_applied(pool, user_name, &id).await?;
    Ok(id)
}

pub async fn load_detail(
    pool: &SqlitePool,
    id: &str,
) -> Result<MembershipDetailView, MembershipError> {
    let row = membership_repo::load_membership_by_id(pool, id)
        .await?
        .ok_or(MembershipError::NotFound)?;
    let history = dedupe_history(parse_history(row.history.as_deref()));
    Ok(MembershipDetailView {
        membership: build_view(row),
        history,
    })
}

pub async fn approve(
    pool: &SqlitePool,
    id: &str,
    approver_user_id: &str,
) -> Result<MembershipDetailView, MembershipError> {
    let row = membership_repo::load_membership_by_id(pool, id)
        .await?
        .ok_or(MembershipError::NotFound)?;
    let now = Utc::now().to_rfc3339();
    let changed = membership_repo::approve_membership(pool, id, approver_user_id, &now).await?;
    if changed == 0 {
        return Err(MembershipError::InvalidStatus(row.status));
    }
    load_detail(pool, id).await
}

pub async fn reject(pool: &SqlitePool, id: &str) -> Result<MembershipDetailView, MembershipError> {
    let row = membership_repo::load_membership_by_id(pool, id)
        .await?
        .ok_or(MembershipError::NotFound)?;
    let now = Utc::now().to_rfc3339();
    let changed = membership_repo::reject_membership(pool, id, &now).await?;
    if changed == 0 {
        return Err(MembershipError::InvalidStatus(row.status));
    }
    load_detail(pool, id).await
}

pub async fn remove(
    pool: &SqlitePool,
    id: &str,
    remover_user_id: &str,
    reason: Option<&str>,
) -> Result<MembershipDetailView, MembershipError> {
    let row = membership_repo::load_membership_by_id(pool, id)
        .await?
        .ok_or(MembershipError::NotFound)?;
    let now = Utc::now().to_rfc3339();

    let entry = HistoryEntry {
        action: "removed".to_string(),
        actor_user_id: remover_user_id.to_string(),
        reason: reason.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        at: now.clone(),
    };
    let history = append_history(parse_history(row.history.as_deref()), entry);
    let history_json = serde_json::to_string(&history).unwrap_or_else(|_| "[]".to_string());

    let changed =
        membership_repo::remove_membership(pool, id, remover_user_id, &history_json, &now).await?;
    if changed == 0 {
        return Err(MembershipError::InvalidStatus(row.status));
    }
    load_detail(pool, id).await
}

pub async fn restore(
    pool: &SqlitePool,
    id: &str,
    actor_user_id: &str,
    note: Option<&str>,
) -> Result<MembershipDetailView, MembershipError> {
    let row = membership_repo::load_membership_by_id(pool, id)
        .await?
        .ok_or(MembershipError::NotFound)?;
    let now = Utc::now().to_rfc3339();

    let entry = HistoryEntry {
        action: "restored".to_string(),
        actor_user_id: actor_user_id.to_string(),
        reason: note.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        at: now.clone(),
    };
    let history = append_history(parse_history(row.history.as_deref()), entry);
    let history_json = serde_json::to_string(&history).unwrap_or_else(|_| "[]".to_string());

    let changed = membership_repo::restore_membership(pool, id, &history_json, &now).await?;
    if changed == 0 {
        return Err(MembershipError::InvalidStatus(row.status));
    }
    load_detail(pool, id).await
}

fn build_view(row: MembershipRow) -> MembershipView {
    MembershipView {
        id: row.id,
        user_id: row.user_id,
        user_name: row.user_name,
        user_email: row.user_email,
        status: row.status,
        approved_by: row.approved_by,
        approved_at: row.approved_at,
        removed_by: row.removed_by,
        removed_at: row.removed_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub fn parse_history(json: Option<&str>) -> Vec<HistoryEntry> {
    let Some(raw) = json else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<HistoryEntry>>(raw).unwrap_or_default()
}

/// Refuses the append when the new entry repeats the tail of the list
/// (same action, actor and reason) so a double submit leaves one entry.
fn append_history(mut history: Vec<HistoryEntry>, entry: HistoryEntry) -> Vec<HistoryEntry> {
    if let Some(last) = history.last() {
        if last.action == entry.action
            && last.actor_user_id == entry.actor_user_id
            && last.reason == entry.reason
        {
            return history;
        }
    }
    history.push(entry);
    history
}

/// Older records carry duplicated removal/restoration entries; collapse them
/// before showing the list. Exact duplicates are dropped wherever they
/// appear, and runs of the same action keep only their first entry.
pub fn dedupe_history(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut out: Vec<HistoryEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if out.iter().any(|e| *e == entry) {
            continue;
        }
        if let Some(last) = out.last() {
            if last.action == entry.action {
                continue;
            }
        }
        out.push(entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{append_history, dedupe_history, HistoryEntry};

    fn entry(action: &str, actor: &str, at: &str) -> HistoryEntry {
        HistoryEntry {
            action: action.to_string(),
            actor_user_id: actor.to_string(),
            reason: None,
            at: at.to_string(),
        }
    }

    #[test]
    fn dedupe_drops_exact_duplicates() {
        let history = vec![
            entry("removed", "a1", "2026-01-01T10:00:00Z"),
            entry("removed", "a1", "2026-01-01T10:00:00Z"),
            entry("restored", "a2", "2026-01-02T10:00:00Z"),
        ];
        let out = dedupe_history(history);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].action, "removed");
        assert_eq!(out[1].action, "restored");
    }

    #[test]
    fn dedupe_collapses_same_action_runs() {
        let history = vec![
            entry("removed", "a1", "2026-01-01T10:00:00Z"),
            entry("removed", "a2", "2026-01-01T10:05:00Z"),
            entry("restored", "a1", "2026-01-02T10:00:00Z"),
            entry("removed", "a1", "2026-01-03T10:00:00Z"),
        ];
        let out = dedupe_history(history);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].actor_user_id, "a1");
        assert_eq!(out[1].action, "restored");
        assert_eq!(out[2].action, "removed");
    }

    #[test]
    fn dedupe_keeps_alternating_entries() {
        let history = vec![
            entry("removed", "a1", "2026-01-01T10:00:00Z"),
            entry("restored", "a1", "2026-01-02T10:00:00Z"),
            entry("removed", "a1", "2026-01-03T10:00:00Z"),
            entry("restored", "a1", "2026-01-04T10:00:00Z"),
        ];
        assert_eq!(dedupe_history(history).len(), 4);
    }

    #[test]
    fn append_skips_repeated_tail() {
        let history = vec![entry("removed", "a1", "2026-01-01T10:00:00Z")];
        let out = append_history(history, entry("removed", "a1", "2026-01-01T10:00:01Z"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn append_accepts_new_action() {
        let history = vec![entry("removed", "a1", "2026-01-01T10:00:00Z")];
        let out = append_history(history, entry("restored", "a1", "2026-01-02T10:00:00Z"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn append_accepts_same_action_other_actor() {
        let history = vec![entry("removed", "a1", "2026-01-01T10:00:00Z")];
        let out = append_history(history, entry("removed", "a2", "2026-01-01T10:00:05Z"));
        assert_eq!(out.len(), 2);
    }
}
