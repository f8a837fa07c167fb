use sqlx::SqlitePool;

use crate::models::CurrentUserRow;

// Single-row table used when the portal runs without the auth service.
const SQL_LOAD_CURRENT_USER: &str = r#"
SELECT user_id, name
FROM current_user
LIMIT 1
"#;

pub async fn load_current_user(pool: &SqlitePool) -> sqlx::Result<Option<CurrentUserRow>> {
    sqlx::query_as::<_, CurrentUserRow>(SQL_LOAD_CURRENT_USER)
        .fetch_optional(pool)
        .await
}
