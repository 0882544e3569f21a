pub mod auth;
pub mod common;
pub mod config;
pub mod errors;
pub mod export;
pub mod records;
pub mod schema;

pub mod database;
pub mod server;
pub mod services;
