use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::{activity_participant_repo, activity_repo};
use crate::models::{ActivityFeedRow, ActivityParticipantRow, ActivityRow};
use crate::services::notification_service;

pub const SLOT_NAMES: [&str; 3] = ["morning", "afternoon", "evening"];

const VISIBILITIES: [&str; 3] = ["public", "members", "private"];
const STATUSES: [&str; 3] = ["draft", "published", "cancelled"];

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("activity not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("activity is cancelled")]
    Cancelled,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub slot: String, // morning|afternoon|evening
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationJson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityPayload {
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: String,
    pub time_slots: Vec<TimeSlot>,
    #[serde(default = "default_location_mode")]
    pub location_mode: String,
    pub location: Option<LocationJson>,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub main_image_url: Option<String>,
}

fn default_location_mode() -> String {
    "single".to_string()
}

fn default_visibility() -> String {
    "members".to_string()
}

fn default_status() -> String {
    "draft".to_string()
}

#[derive(Serialize)]
pub struct ActivitySummaryView {
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

#[derive(Serialize)]
pub struct ActivityPersonView {
    pub user_id: String,
    pub name: String,
    pub role: String,
    pub joined_at: String,
}

#[derive(Serialize)]
pub struct ActivityDetailView {
    pub activity_id: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: String,
    pub time_slots: Vec<TimeSlot>,
    pub location_mode: String,
    pub location: Option<LocationJson>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub visibility: String,
    pub status: String,
    pub main_image_url: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub organizers: Vec<ActivityPersonView>,
    pub participants: Vec<ActivityPersonView>,
}

pub async fn list_activities(
    pool: &SqlitePool,
    past: bool,
    status: Option<&str>,
) -> Result<Vec<ActivitySummaryView>, ActivityError> {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let rows = activity_repo::list_activities(pool, &today, past).await?;
    Ok(rows
        .into_iter()
        .filter(|r| status.map(|s| r.status == s).unwrap_or(true))
        .map(build_summary_view)
        .collect())
}

pub async fn create_activity(
    pool: &SqlitePool,
    created_by: &str,
    payload: ActivityPayload,
) -> Result<String, ActivityError> {
    let payload = validate_payload(payload)?;

    let activity_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let slots_json = serde_json::to_string(&payload.time_slots).unwrap_or_else(|_| "[]".to_string());
    let location_json = payload
        .location
        .as_ref()
        .and_then(|l| serde_json::to_string(l).ok());
    let (latitude, longitude) = location_coords(payload.location.as_ref());

    activity_repo::insert_activity(
        pool,
        activity_repo::NewActivity {
            activity_id: &activity_id,
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            scheduled_date: &payload.scheduled_date,
            time_slots_json: &slots_json,
            location_mode: &payload.location_mode,
            location_json: location_json.as_deref(),
            latitude,
            longitude,
            visibility: &payload.visibility,
            status: &payload.status,
            main_image_url: payload.main_image_url.as_deref(),
            created_by,
            now: &now,
        },
    )
    .await?;

    // The creator shows up as organizer right away.
    activity_participant_repo::upsert_participant(
        pool,
        activity_participant_repo::NewParticipant {
            id: &Uuid::new_v4().to_string(),
            activity_id: &activity_id,
            user_id: created_by,
            name: None,
            role: "organizer",
            joined_at: &now,
        },
    )
    .await?;

    Ok(activity_id)
}

pub async fn update_activity(
    pool: &SqlitePool,
    activity_id: &str,
    payload: ActivityPayload,
) -> Result<ActivityDetailView, ActivityError> {
    let existing = activity_repo::load_activity_by_id(pool, activity_id)
        .await?
        .ok_or(ActivityError::NotFound)?;
    let payload = validate_payload(payload)?;

    let now = Utc::now().to_rfc3339();
    let slots_json = serde_json::to_string(&payload.time_slots).unwrap_or_else(|_| "[]".to_string());
    let location_json = payload
        .location
        .as_ref()
        .and_then(|l| serde_json::to_string(l).ok());
    let (latitude, longitude) = location_coords(payload.location.as_ref());

    let was_cancelled = existing.status == "cancelled";
    activity_repo::update_activity(
        pool,
        activity_id,
        activity_repo::ActivityUpdate {
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            scheduled_date: &payload.scheduled_date,
            time_slots_json: &slots_json,
            location_mode: &payload.location_mode,
            location_json: location_json.as_deref(),
            latitude: latitude.or(existing.latitude),
            longitude: longitude.or(existing.longitude),
            visibility: &payload.visibility,
            status: &payload.status,
            main_image_url: payload.main_image_url.as_deref(),
            now: &now,
        },
    )
    .await?;

    if payload.status == "cancelled" && !was_cancelled {
        let participant_ids =
            activity_participant_repo::list_participant_user_ids(pool, activity_id).await?;
        notification_service::notify_activity_cancelled(
            pool,
            &existing.title,
            activity_id,
            &participant_ids,
        )
        .await?;
    }

    load_detail(pool, activity_id).await
}

pub async fn load_detail(
    pool: &SqlitePool,
    activity_id: &str,
) -> Result<ActivityDetailView, ActivityError> {
    let row = activity_repo::load_activity_by_id(pool, activity_id)
        .await?
        .ok_or(ActivityError::NotFound)?;
    let participants = activity_participant_repo::list_participants(pool, activity_id).await?;
    Ok(build_detail_view(row, participants))
}

pub async fn delete_activity(pool: &SqlitePool, activity_id: &str) -> Result<(), ActivityError> {
    let now = Utc::now().to_rfc3339();
    let changed = activity_repo::soft_delete_activity(pool, activity_id, &now).await?;
    if changed == 0 {
        return Err(ActivityError::NotFound);
    }
    Ok(())
}

pub async fn signup(
    pool: &SqlitePool,
    actor_user_id: &str,
    activity_id: &str,
    subject_user_id: &str,
    subject_name: Option<&str>,
    action: &str,
    role: Option<&str>,
) -> Result<(), ActivityError> {
    let row = activity_repo::load_activity_by_id(pool, activity_id)
        .await?
        .ok_or(ActivityError::NotFound)?;
    if row.status == "cancelled" {
        return Err(ActivityError::Cancelled);
    }

    let role = match role {
        Some("organizer") => "organizer",
        Some("participant") | None => "participant",
        Some(other) => {
            return Err(ActivityError::Validation(format!("unknown role '{}'", other)))
        }
    };

    match action {
        "join" => {
            let now = Utc::now().to_rfc3339();
            activity_participant_repo::upsert_participant(
                pool,
                activity_participant_repo::NewParticipant {
                    id: &Uuid::new_v4().to_string(),
                    activity_id,
                    user_id: subject_user_id,
                    name: subject_name,
                    role,
                    joined_at: &now,
                },
            )
            .await?;
        }
        "leave" => {
            activity_participant_repo::leave_participant(pool, activity_id, subject_user_id)
                .await?;
        }
        other => {
            return Err(ActivityError::Validation(format!(
                "unknown action '{}'",
                other
            )))
        }
    }

    tracing::info!(
        actor = %actor_user_id,
        subject = %subject_user_id,
        activity = %activity_id,
        action,
        "activity signup command"
    );
    Ok(())
}

fn build_summary_view(row: ActivityFeedRow) -> ActivitySummaryView {
    ActivitySummaryView {
        activity_id: row.activity_id,
        title: row.title,
        scheduled_date: row.scheduled_date,
        status: row.status,
        visibility: row.visibility,
        main_image_url: row.main_image_url,
        latitude: row.latitude,
        longitude: row.longitude,
        participant_count: row.participant_count,
        organizer_name: row.organizer_name,
    }
}

fn build_detail_view(
    row: ActivityRow,
    participants: Vec<ActivityParticipantRow>,
) -> ActivityDetailView {
    let time_slots = parse_time_slots(&row.time_slots);
    let location = row
        .location
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok());

    let mut organizers = Vec::new();
    let mut members = Vec::new();
    for p in participants {
        let view = ActivityPersonView {
            user_id: p.user_id,
            name: p.name.unwrap_or_else(|| "Onbekend".to_string()),
            role: p.role.clone(),
            joined_at: p.joined_at,
        };
        if p.role == "organizer" {
            organizers.push(view);
        } else {
            members.push(view);
        }
    }

    ActivityDetailView {
        activity_id: row.activity_id,
        title: row.title,
        description: row.description,
        scheduled_date: row.scheduled_date,
        time_slots,
        location_mode: row.location_mode,
        location,
        latitude: row.latitude,
        longitude: row.longitude,
        visibility: row.visibility,
        status: row.status,
        main_image_url: row.main_image_url,
        created_by: row.created_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
        organizers,
        participants: members,
    }
}

pub fn parse_time_slots(json: &str) -> Vec<TimeSlot> {
    serde_json::from_str::<Vec<TimeSlot>>(json).unwrap_or_default()
}

fn location_coords(location: Option<&LocationJson>) -> (Option<f64>, Option<f64>) {
    match location {
        Some(l) => (l.latitude, l.longitude),
        None => (None, None),
    }
}

fn validate_payload(payload: ActivityPayload) -> Result<ActivityPayload, ActivityError> {
    if payload.title.trim().is_empty() {
        return Err(ActivityError::Validation("title is required".to_string()));
    }
    if parse_ymd(&payload.scheduled_date).is_none() {
        return Err(ActivityError::Validation(
            "scheduled_date must be YYYY-MM-DD".to_string(),
        ));
    }
    if !VISIBILITIES.contains(&payload.visibility.as_str()) {
        return Err(ActivityError::Validation(format!(
            "unknown visibility '{}'",
            payload.visibility
        )));
    }
    if !STATUSES.contains(&payload.status.as_str()) {
        return Err(ActivityError::Validation(format!(
            "unknown status '{}'",
            payload.status
        )));
    }
    validate_time_slots(&payload.time_slots).map_err(ActivityError::Validation)?;
    validate_locations(
        &payload.location_mode,
        payload.location.as_ref(),
        &payload.time_slots,
    )
    .map_err(ActivityError::Validation)?;
    Ok(payload)
}

pub fn validate_time_slots(slots: &[TimeSlot]) -> Result<(), String> {
    let mut seen = Vec::new();
    let mut active = 0;
    for slot in slots {
        if !SLOT_NAMES.contains(&slot.slot.as_str()) {
            return Err(format!("unknown time slot '{}'", slot.slot));
        }
        if seen.contains(&slot.slot.as_str()) {
            return Err(format!("duplicate time slot '{}'", slot.slot));
        }
        seen.push(slot.slot.as_str());

        if !slot.active {
            continue;
        }
        active += 1;

        let start = slot
            .start_time
            .as_deref()
            .ok_or_else(|| format!("slot '{}' is missing start_time", slot.slot))?;
        let end = slot
            .end_time
            .as_deref()
            .ok_or_else(|| format!("slot '{}' is missing end_time", slot.slot))?;
        if !is_valid_hhmm(start) || !is_valid_hhmm(end) {
            return Err(format!("slot '{}' has an invalid time, expected HH:MM", slot.slot));
        }
        // Zero-padded HH:MM orders correctly as a plain string compare.
        if start >= end {
            return Err(format!("slot '{}' must start before it ends", slot.slot));
        }
    }

    if active == 0 {
        return Err("at least one active time slot is required".to_string());
    }
    Ok(())
}

pub fn validate_locations(
    location_mode: &str,
    location: Option<&LocationJson>,
    slots: &[TimeSlot],
) -> Result<(), String> {
    match location_mode {
        "single" => {
            if location.is_none() {
                return Err("a location is required when location_mode is 'single'".to_string());
            }
        }
        "per_slot" => {
            for slot in slots.iter().filter(|s| s.active) {
                if slot.location.is_none() {
                    return Err(format!(
                        "active slot '{}' needs a location when location_mode is 'per_slot'",
                        slot.slot
                    ));
                }
            }
        }
        other => return Err(format!("unknown location_mode '{}'", other)),
    }
    Ok(())
}

pub fn is_valid_hhmm(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let Ok(hour) = value[0..2].parse::<u32>() else {
        return false;
    };
    let Ok(minute) = value[3..5].parse::<u32>() else {
        return false;
    };
    hour < 24 && minute < 60
}

fn parse_ymd(date: &str) -> Option<(i32, i32, i32)> {
    let mut parts = date.split('-');
    let y: i32 = parts.next()?.parse().ok()?;
    let m: i32 = parts.next()?.parse().ok()?;
    let d: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if !(1..=12).contains(&m) || !(1..=31).contains(&d) || y < 1970 {
        return None;
    }
    Some((y, m, d))
}

#[cfg(test)]
mod tests {
    use super::{
        is_valid_hhmm, parse_ymd, validate_locations, validate_time_slots, LocationJson, TimeSlot,
    };

    fn slot(name: &str, active: bool, start: Option<&str>, end: Option<&str>) -> TimeSlot {
        TimeSlot {
            slot: name.to_string(),
            active,
            start_time: start.map(|s| s.to_string()),
            end_time: end.map(|s| s.to_string()),
            location: None,
        }
    }

    #[test]
    fn valid_slot_set_passes() {
        let slots = vec![
            slot("morning", true, Some("09:00"), Some("12:00")),
            slot("afternoon", false, None, None),
            slot("evening", true, Some("19:30"), Some("22:00")),
        ];
        assert!(validate_time_slots(&slots).is_ok());
    }

    #[test]
    fn no_active_slot_fails() {
        let slots = vec![slot("morning", false, None, None)];
        assert!(validate_time_slots(&slots).is_err());
    }

    #[test]
    fn unknown_slot_name_fails() {
        let slots = vec![slot("night", true, Some("22:00"), Some("23:00"))];
        assert!(validate_time_slots(&slots).is_err());
    }

    #[test]
    fn duplicate_slot_name_fails() {
        let slots = vec![
            slot("morning", true, Some("09:00"), Some("10:00")),
            slot("morning", false, None, None),
        ];
        assert!(validate_time_slots(&slots).is_err());
    }

    #[test]
    fn inverted_time_range_fails() {
        let slots = vec![slot("morning", true, Some("12:00"), Some("09:00"))];
        assert!(validate_time_slots(&slots).is_err());
    }

    #[test]
    fn active_slot_without_times_fails() {
        let slots = vec![slot("afternoon", true, None, None)];
        assert!(validate_time_slots(&slots).is_err());
    }

    #[test]
    fn hhmm_validation() {
        assert!(is_valid_hhmm("00:00"));
        assert!(is_valid_hhmm("23:59"));
        assert!(!is_valid_hhmm("24:00"));
        assert!(!is_valid_hhmm("12:60"));
        assert!(!is_valid_hhmm("9:00"));
        assert!(!is_valid_hhmm("0900"));
        assert!(!is_valid_hhmm("ab:cd"));
    }

    #[test]
    fn single_mode_requires_location() {
        let slots = vec![slot("morning", true, Some("09:00"), Some("10:00"))];
        assert!(validate_locations("single", None, &slots).is_err());
        let loc = LocationJson::default();
        assert!(validate_locations("single", Some(&loc), &slots).is_ok());
    }

    #[test]
    fn per_slot_mode_requires_location_on_active_slots() {
        let mut with_loc = slot("morning", true, Some("09:00"), Some("10:00"));
        with_loc.location = Some(LocationJson::default());
        let without_loc = slot("evening", true, Some("19:00"), Some("20:00"));

        assert!(validate_locations("per_slot", None, &[with_loc.clone()]).is_ok());
        assert!(validate_locations("per_slot", None, &[with_loc, without_loc]).is_err());
    }

    #[test]
    fn unknown_location_mode_fails() {
        assert!(validate_locations("hybrid", None, &[]).is_err());
    }

    #[test]
    fn ymd_parsing() {
        assert_eq!(parse_ymd("2026-08-07"), Some((2026, 8, 7)));
        assert!(parse_ymd("2026-13-01").is_none());
        assert!(parse_ymd("07-08-2026").is_none());
        assert!(parse_ymd("2026-08").is_none());
        assert!(parse_ymd("not-a-date").is_none());
    }
}
