use std::fmt;

use chrono::Utc;
use sea_orm::*;
use tracing::debug;

use crate::auth::RequestContext;
use crate::database::entities::activity_log;
use crate::errors::CoreResult;
use crate::records::{Page, PageRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    ResetPassword,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::ResetPassword => "reset_password",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appends one entry. Takes any connection so callers can pass the
/// transaction that carries the audited change.
pub async fn record_entry<C>(
    conn: &C,
    actor: &RequestContext,
    action: AuditAction,
    table_name: &str,
    record_label: Option<String>,
) -> CoreResult<activity_log::Model>
where
    C: ConnectionTrait,
{
    let entry = activity_log::ActiveModel {
        user: Set(actor.username.clone()),
        action: Set(action.as_str().to_string()),
        table_name: Set(table_name.to_string()),
        record_id: Set(record_label),
        timestamp: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    debug!(
        "Audit: {} {} {} {:?}",
        entry.user, entry.action, entry.table_name, entry.record_id
    );
    Ok(entry)
}

/// Read side of the activity log.
#[derive(Clone)]
pub struct AuditService {
    db: DatabaseConnection,
}

impl AuditService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest first.
    pub async fn list(&self, page: PageRequest) -> CoreResult<Page<activity_log::Model>> {
        let total = activity_log::Entity::find().count(&self.db).await?;
        let items = activity_log::Entity::find()
            .order_by_desc(activity_log::Column::Timestamp)
            .order_by_desc(activity_log::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await?;

        Ok(Page::new(items, page, total))
    }

    pub async fn all(&self) -> CoreResult<Vec<activity_log::Model>> {
        Ok(activity_log::Entity::find()
            .order_by_desc(activity_log::Column::Timestamp)
            .order_by_desc(activity_log::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn export_workbook(&self) -> CoreResult<Vec<u8>> {
        let entries = self.all().await?;
        crate::export::to_xlsx_activity::render(&entries)
    }
}
