pub mod activities;
pub mod activity_participants;
pub mod comments;
pub mod current_user;
pub mod memberships;
pub mod news_posts;
pub mod notifications;

pub use activities::{ActivityFeedRow, ActivityRow};
pub use activity_participants::ActivityParticipantRow;
pub use comments::CommentRow;
pub use current_user::CurrentUserRow;
pub use memberships::MembershipRow;
pub use news_posts::NewsPostRow;
pub use notifications::NotificationRow;
