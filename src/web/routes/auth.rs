use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cookie::Cookie;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::web::middleware::auth as auth_middleware;
use crate::web::routes::fail;

#[derive(Deserialize)]
pub struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct AuthTokens {
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct AuthServiceResponse {
    #[serde(rename = "success")]
    _success: bool,
    data: AuthTokens,
}

fn auth_api_url() -> String {
    std::env::var("AUTH_API_URL").unwrap_or_else(|_| "http://auth.localhost:8080".to_string())
}

pub async fn login_handler(Json(body): Json<LoginBody>) -> Response {
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/auth/login", auth_api_url().trim_end_matches('/'));

    let response = match client
        .post(&url)
        .json(&json!({
            "email": body.email,
            "password": body.password,
        }))
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            error!("Request naar auth-service failed: {}", e);
            return fail(StatusCode::BAD_GATEWAY, "auth_unreachable").into_response();
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!("Auth service error: {}", status);
        return fail(StatusCode::UNAUTHORIZED, "invalid_credentials").into_response();
    }

    let tokens = match response.json::<AuthServiceResponse>().await {
        Ok(wrapper) => wrapper.data,
        Err(e) => {
            error!("Kan auth response niet parsen: {}", e);
            return fail(StatusCode::BAD_GATEWAY, "auth_bad_response").into_response();
        }
    };

    let user_id = auth_middleware::decode_token(&tokens.access_token)
        .map(|u| u.id)
        .unwrap_or_default();

    let mut access_cookie = Cookie::new("access_token", tokens.access_token.clone());
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(cookie::SameSite::Lax);

    let mut refresh_cookie = Cookie::new("refresh_token", tokens.refresh_token);
    refresh_cookie.set_path("/");
    refresh_cookie.set_http_only(true);
    refresh_cookie.set_same_site(cookie::SameSite::Lax);

    let mut response =
        Json(json!({ "success": true, "data": { "user_id": user_id } })).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        access_cookie.to_string().parse().unwrap(),
    );
    response.headers_mut().append(
        header::SET_COOKIE,
        refresh_cookie.to_string().parse().unwrap(),
    );

    response
}

pub async fn logout_handler() -> Response {
    // Clear cookies
    let mut access_cookie = Cookie::new("access_token", "");
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(cookie::SameSite::Lax);

    let mut refresh_cookie = Cookie::new("refresh_token", "");
    refresh_cookie.set_path("/");
    refresh_cookie.set_http_only(true);
    refresh_cookie.set_same_site(cookie::SameSite::Lax);

    let mut response = Json(json!({ "success": true, "data": null })).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        access_cookie.to_string().parse().unwrap(),
    );
    response.headers_mut().append(
        header::SET_COOKIE,
        refresh_cookie.to_string().parse().unwrap(),
    );

    response
}
