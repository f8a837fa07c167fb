use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub mod activities;
pub mod auth;
pub mod location;
pub mod memberships;
pub mod news;
pub mod notifications;
pub mod uploads;

pub type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn ok(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

pub fn fail(status: StatusCode, error: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "success": false, "error": error })))
}
