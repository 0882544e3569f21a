pub mod audit_service;
pub mod auth_service;
pub mod backup_service;
pub mod record_service;
pub mod user_service;

pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use backup_service::BackupService;
pub use record_service::RecordService;
pub use user_service::UserService;
