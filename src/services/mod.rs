pub mod activity_geo_service;
pub mod activity_service;
pub mod location_service;
pub mod membership_service;
pub mod news_service;
pub mod notification_service;
pub mod upload_service;
