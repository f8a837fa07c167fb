use sqlx::SqlitePool;

const SQL_CREATE_MEMBERSHIPS: &str = r#"
CREATE TABLE IF NOT EXISTS memberships (
  id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL,
  user_name TEXT NOT NULL,
  user_email TEXT,
  status TEXT NOT NULL DEFAULT 'PENDING',
  approved_by TEXT,
  approved_at TEXT,
  removed_by TEXT,
  removed_at TEXT,
  history TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  is_deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const SQL_CREATE_ACTIVITIES: &str = r#"
CREATE TABLE IF NOT EXISTS activities (
  activity_id TEXT PRIMARY KEY,
  title TEXT NOT NULL,
  description TEXT,
  scheduled_date TEXT NOT NULL,
  time_slots TEXT NOT NULL,
  location_mode TEXT NOT NULL DEFAULT 'single',
  location TEXT,
  latitude REAL,
  longitude REAL,
  visibility TEXT NOT NULL DEFAULT 'members',
  status TEXT NOT NULL DEFAULT 'draft',
  main_image_url TEXT,
  created_by TEXT NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  is_deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const SQL_CREATE_ACTIVITY_PARTICIPANTS: &str = r#"
CREATE TABLE IF NOT EXISTS activity_participants (
  id TEXT PRIMARY KEY,
  activity_id TEXT NOT NULL,
  user_id TEXT NOT NULL,
  name TEXT,
  role TEXT NOT NULL DEFAULT 'participant',
  joined_at TEXT NOT NULL,
  is_deleted INTEGER NOT NULL DEFAULT 0,
  UNIQUE (activity_id, user_id)
)
"#;

const SQL_CREATE_NEWS_POSTS: &str = r#"
CREATE TABLE IF NOT EXISTS news_posts (
  post_id TEXT PRIMARY KEY,
  title TEXT NOT NULL,
  content TEXT NOT NULL,
  image_urls TEXT,
  pdf_url TEXT,
  author_user_id TEXT NOT NULL,
  author_name TEXT,
  like_count INTEGER NOT NULL DEFAULT 0,
  liked_by TEXT,
  comment_count INTEGER NOT NULL DEFAULT 0,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  is_deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const SQL_CREATE_NEWS_COMMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS news_comments (
  comment_id TEXT PRIMARY KEY,
  post_id TEXT NOT NULL,
  parent_comment_id TEXT,
  author_user_id TEXT NOT NULL,
  author_name TEXT,
  content TEXT NOT NULL,
  image_url TEXT,
  like_count INTEGER NOT NULL DEFAULT 0,
  liked_by TEXT,
  created_at TEXT NOT NULL,
  is_deleted INTEGER NOT NULL DEFAULT 0
)
"#;

const SQL_CREATE_NOTIFICATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS notifications (
  id TEXT PRIMARY KEY,
  recipient_user_id TEXT,
  kind TEXT NOT NULL,
  body TEXT NOT NULL,
  link TEXT,
  is_read INTEGER NOT NULL DEFAULT 0,
  created_at TEXT NOT NULL
)
"#;

const SQL_CREATE_CURRENT_USER: &str = r#"
CREATE TABLE IF NOT EXISTS current_user (
  user_id TEXT NOT NULL,
  name TEXT
)
"#;

/// Creates missing tables on startup so a fresh SQLite file works out of the box.
pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    let statements = [
        SQL_CREATE_MEMBERSHIPS,
        SQL_CREATE_ACTIVITIES,
        SQL_CREATE_ACTIVITY_PARTICIPANTS,
        SQL_CREATE_NEWS_POSTS,
        SQL_CREATE_NEWS_COMMENTS,
        SQL_CREATE_NOTIFICATIONS,
        SQL_CREATE_CURRENT_USER,
    ];
    for sql in statements {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}
