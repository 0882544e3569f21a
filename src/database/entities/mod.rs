pub mod activity_log;
pub mod user_sessions;
pub mod users;
