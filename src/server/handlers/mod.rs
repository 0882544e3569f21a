pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod print;
pub mod records;
pub mod recovery;
pub mod users;
