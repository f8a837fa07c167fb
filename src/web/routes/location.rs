use axum::{extract::Query, http::StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::services::location_service;
use crate::web::routes::{fail, ok, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LocationSearchQuery {
    q: Option<String>,
    limit: Option<usize>,
}

pub async fn search_locations(Query(query): Query<LocationSearchQuery>) -> ApiResult {
    let q = match query.q.as_ref().map(|s| s.trim()).filter(|s| s.len() >= 2) {
        Some(v) => v,
        None => return Err(fail(StatusCode::BAD_REQUEST, "query_too_short")),
    };

    let limit = query.limit.unwrap_or(8).min(20);
    match location_service::search_locations_upstream(q, limit).await {
        Ok(results) => Ok(ok(json!({ "locations": results }))),
        Err(_) => Err(fail(StatusCode::BAD_GATEWAY, "location_upstream_failed")),
    }
}
