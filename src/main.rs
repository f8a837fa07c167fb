use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, get_service, post},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use clubportal::database::schema;
use clubportal::web::middleware::auth as auth_middleware;
use clubportal::web::routes::{
    activities, auth, location, memberships, news, notifications, uploads,
};

#[tokio::main]
async fn main() {
    // Laad .env bestand
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();

    // 2. Verbind met de Database
    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL moet in .env staan");
    println!("Verbinden met database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Kan niet verbinden met DB");

    schema::ensure_schema(&pool)
        .await
        .expect("Kan schema niet aanmaken");

    // 3. Protected routes onder één middleware layer
    let protected_routes = Router::new()
        .route(
            "/api/memberships",
            get(memberships::list_handler).post(memberships::create_handler),
        )
        .route("/api/memberships/:id", get(memberships::detail_handler))
        .route("/api/memberships/:id/approve", post(memberships::approve_handler))
        .route("/api/memberships/:id/reject", post(memberships::reject_handler))
        .route("/api/memberships/:id/remove", post(memberships::remove_handler))
        .route("/api/memberships/:id/restore", post(memberships::restore_handler))
        .route(
            "/api/activities",
            get(activities::list_handler).post(activities::create_handler),
        )
        .route(
            "/api/activities/:activity_id",
            get(activities::detail_handler)
                .put(activities::update_handler)
                .delete(activities::delete_handler),
        )
        .route(
            "/api/activities/:activity_id/signup",
            post(activities::signup_handler),
        )
        .route("/api/news", get(news::feed_handler).post(news::create_handler))
        .route(
            "/api/news/:post_id",
            get(news::detail_handler)
                .put(news::update_handler)
                .delete(news::delete_handler),
        )
        .route("/api/news/:post_id/like", post(news::like_handler))
        .route(
            "/api/news/:post_id/comments",
            get(news::list_comments_handler).post(news::add_comment_handler),
        )
        .route(
            "/api/news/comments/:comment_id/like",
            post(news::like_comment_handler),
        )
        .route(
            "/api/news/comments/:comment_id",
            axum::routing::delete(news::delete_comment_handler),
        )
        .route("/api/notifications", get(notifications::list_handler))
        .route(
            "/api/notifications/read-all",
            post(notifications::mark_all_read_handler),
        )
        .route(
            "/api/notifications/:id/read",
            post(notifications::mark_read_handler),
        )
        .route(
            "/api/upload/activity-image",
            post(uploads::activity_image_handler),
        )
        .route("/api/upload/news-image", post(uploads::news_image_handler))
        .route("/api/upload/news-pdf", post(uploads::news_pdf_handler))
        .route("/api/location/search", get(location::search_locations))
        .route("/api/auth/logout", post(auth::logout_handler))
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            auth_middleware::require_auth,
        ));

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

    // 4. Bouw de hele applicatie
    let app = Router::new()
        // Public routes
        .route("/api/auth/login", post(auth::login_handler))
        // Protected routes
        .merge(protected_routes)
        // Uploaded files
        .nest_service(
            "/uploads",
            get_service(ServeDir::new(upload_dir)).layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=3600"),
            )),
        )
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        // Ruim boven de PDF-limiet van de uploads
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        // State
        .with_state(pool);

    // 5. Start de server (met fallback poort)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Kan host/port niet parsen");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "⚠️  Kon niet binden op {}: {}. Probeer fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Kan fallback niet parsen");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Kan niet binden op fallback poort")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    println!("🚀 Ledenportaal draait op http://{}", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
