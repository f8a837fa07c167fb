use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::info;
use tracing::warn;

use crate::database::activity_repo;
use crate::services::activity_service::LocationJson;
use crate::services::location_service;

#[derive(Debug, Default)]
pub struct ActivityGeoBackfillReport {
    pub candidates: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub async fn backfill_activity_geo(
    pool: &SqlitePool,
    limit: i64,
) -> sqlx::Result<ActivityGeoBackfillReport> {
    let candidates = activity_repo::list_activities_missing_geo(pool, limit).await?;
    let mut report = ActivityGeoBackfillReport {
        candidates: candidates.len(),
        ..Default::default()
    };

    let mut cache: HashMap<String, (f64, f64)> = HashMap::new();

    for row in candidates {
        if row.latitude.is_some() && row.longitude.is_some() {
            report.skipped += 1;
            continue;
        }

        let parsed: LocationJson = serde_json::from_str(&row.location).unwrap_or_default();
        // Coordinates already picked on the map don't need a lookup.
        if let (Some(lat), Some(lon)) = (parsed.latitude, parsed.longitude) {
            let updated = activity_repo::update_activity_geo(pool, &row.activity_id, lat, lon).await?;
            if updated > 0 {
                report.updated += 1;
            } else {
                report.failed += 1;
            }
            continue;
        }

        let queries = build_queries(&parsed, &row.title);

        let mut chosen: Option<(f64, f64)> = None;
        for query in queries {
            let cache_key = query.to_lowercase();
            if let Some((lat, lon)) = cache.get(&cache_key).copied() {
                chosen = Some((lat, lon));
                break;
            }

            let coords = match location_service::search_locations_upstream(&query, 3).await {
                Ok(results) => results.first().map(|r| (r.latitude, r.longitude)),
                Err(_) => {
                    report.failed += 1;
                    chosen = None;
                    break;
                }
            };

            if let Some((lat, lon)) = coords {
                cache.insert(cache_key, (lat, lon));
                chosen = Some((lat, lon));
                break;
            }
        }

        let Some((lat, lon)) = chosen else {
            warn!(
                "📍 No coords found for activity {} (title='{}')",
                row.activity_id, row.title
            );
            report.failed += 1;
            continue;
        };

        let updated = activity_repo::update_activity_geo(pool, &row.activity_id, lat, lon).await?;
        if updated > 0 {
            report.updated += 1;
        } else {
            report.failed += 1;
        }
    }

    info!(
        "📍 Activity geo backfill done: candidates={}, updated={}, skipped={}, failed={}",
        report.candidates, report.updated, report.skipped, report.failed
    );

    Ok(report)
}

fn build_queries(loc: &LocationJson, fallback_title: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for field in [&loc.venue_name, &loc.city, &loc.postal_code, &loc.country] {
        if let Some(v) = field.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            parts.push(v.to_string());
        }
    }

    let mut queries = Vec::new();
    if !parts.is_empty() {
        queries.push(parts.join(" "));
    }

    if let Some(city) = loc.city.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if let Some(country) = loc
            .country
            .as_ref()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
        {
            queries.push(format!("{} {}", city, country));
        }
        queries.push(city.to_string());
    }

    if queries.is_empty() {
        queries.push(fallback_title.to_string());
    }

    let mut seen = std::collections::HashSet::new();
    queries
        .into_iter()
        .filter(|q| seen.insert(q.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::build_queries;
    use crate::services::activity_service::LocationJson;

    #[test]
    fn full_location_builds_specific_query_first() {
        let loc = LocationJson {
            venue_name: Some("Clubhuis De Brug".to_string()),
            city: Some("Utrecht".to_string()),
            postal_code: Some("3511 AB".to_string()),
            country: Some("Nederland".to_string()),
            ..Default::default()
        };
        let queries = build_queries(&loc, "Zomerfeest");
        assert_eq!(queries[0], "Clubhuis De Brug Utrecht 3511 AB Nederland");
        assert!(queries.contains(&"Utrecht Nederland".to_string()));
        assert!(queries.contains(&"Utrecht".to_string()));
    }

    #[test]
    fn empty_location_falls_back_to_title() {
        let queries = build_queries(&LocationJson::default(), "Zomerfeest");
        assert_eq!(queries, vec!["Zomerfeest".to_string()]);
    }

    #[test]
    fn duplicate_queries_are_deduped() {
        let loc = LocationJson {
            city: Some("Utrecht".to_string()),
            ..Default::default()
        };
        let queries = build_queries(&loc, "x");
        // "Utrecht" would appear both as the joined query and the city query.
        assert_eq!(queries, vec!["Utrecht".to_string()]);
    }
}
