pub mod activity_participant_repo;
pub mod activity_repo;
pub mod comment_repo;
pub mod current_user_repo;
pub mod membership_repo;
pub mod news_repo;
pub mod notification_repo;
pub mod schema;
