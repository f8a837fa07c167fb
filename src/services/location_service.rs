use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize, Clone)]
pub struct LocationResult {
    pub id: String,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct Geo {
    lat: Option<f64>,
    lng: Option<f64>,
}

// The upstream index mixes Dutch and English field names depending on which
// importer wrote the document, so accept both.
#[derive(Debug, Deserialize)]
struct LocationHit {
    id: Option<String>,
    #[serde(alias = "naam")]
    name: Option<String>,
    #[serde(alias = "weergave")]
    description: Option<String>,
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "longitude")]
    lon: Option<f64>,
    #[serde(rename = "_geo")]
    geo: Option<Geo>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Option<Vec<LocationHit>>,
}

pub async fn search_locations_upstream(q: &str, limit: usize) -> Result<Vec<LocationResult>, ()> {
    let q = q.trim();
    if q.len() < 2 {
        return Ok(Vec::new());
    }

    let limit = limit.clamp(1, 20);
    let base_url =
        std::env::var("LOCATIE_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let host_header =
        std::env::var("LOCATIE_SERVICE_HOST").unwrap_or_else(|_| "locatie.localhost".to_string());
    let api_key = std::env::var("LOCATIE_API_KEY").ok();

    let url = format!("{}/search", base_url.trim_end_matches('/'));
    let client = reqwest::Client::new();

    let mut req = client
        .get(&url)
        .query(&[("q", q), ("limit", &limit.to_string())])
        .header("Host", host_header);

    if let Some(key) = api_key {
        req = req.header("x-api-key", key);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("📍 Locatie search upstream unreachable: {}", e);
            return Err(());
        }
    };

    if !resp.status().is_success() {
        warn!("📍 Locatie search upstream non-OK: {}", resp.status());
        return Err(());
    }

    let parsed: SearchResponse = match resp.json().await {
        Ok(data) => data,
        Err(e) => {
            warn!("📍 Locatie search upstream JSON parse failed: {}", e);
            return Err(());
        }
    };

    let hits = parsed.hits.unwrap_or_default();
    let results = hits
        .into_iter()
        .filter_map(|hit| {
            let lat = hit.geo.as_ref().and_then(|g| g.lat).or(hit.lat)?;
            let lon = hit.geo.as_ref().and_then(|g| g.lng).or(hit.lon)?;

            Some(LocationResult {
                id: hit.id.unwrap_or_default(),
                name: hit.name.unwrap_or_default(),
                description: hit.description.unwrap_or_default(),
                latitude: lat,
                longitude: lon,
            })
        })
        .collect::<Vec<_>>();

    Ok(results)
}
