use std::collections::HashMap;

use indexmap::IndexMap;
use sea_orm::sea_query::{Alias, Expr, Query, SelectStatement, SimpleExpr};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::auth::RequestContext;
use crate::errors::{CoreError, CoreResult};
use crate::records::query::{count_records, select_record, select_records};
use crate::records::status::today_utc;
use crate::records::{
    coerce_form, CoercionPolicy, FieldValue, Page, PageRequest, Record, RecordFilter, SortOrder,
};
use crate::schema::{introspect::humanize, RecordType};
use crate::services::audit_service::{record_entry, AuditAction};

/// Generic create/read/update/delete over every registered record type.
#[derive(Clone)]
pub struct RecordService {
    db: DatabaseConnection,
    policy: CoercionPolicy,
}

impl RecordService {
    pub fn new(db: DatabaseConnection, policy: CoercionPolicy) -> Self {
        Self { db, policy }
    }

    /// Interactive listing: filtered, newest first, one page.
    pub async fn list(
        &self,
        rtype: RecordType,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> CoreResult<Page<Record>> {
        let total = count_matching(&self.db, rtype, filter).await?;
        let records = query_records(
            &self.db,
            rtype,
            &select_records(rtype, filter, SortOrder::Newest, Some(page)),
        )
        .await?;
        Ok(Page::new(records, page, total))
    }

    /// Every matching record in ascending id order, for print and export.
    pub async fn list_all(&self, rtype: RecordType, filter: &RecordFilter) -> CoreResult<Vec<Record>> {
        query_records(
            &self.db,
            rtype,
            &select_records(rtype, filter, SortOrder::Oldest, None),
        )
        .await
    }

    pub async fn get(&self, rtype: RecordType, id: i32) -> CoreResult<Record> {
        let mut record = fetch_record(&self.db, rtype, id)
            .await?
            .ok_or_else(|| CoreError::not_found(rtype.title(), id.to_string()))?;
        record.refresh_status(today_utc());
        Ok(record)
    }

    pub async fn count(&self, rtype: RecordType) -> CoreResult<u64> {
        count_matching(&self.db, rtype, &RecordFilter::default()).await
    }

    pub async fn counts(&self) -> CoreResult<Vec<(RecordType, u64)>> {
        let mut counts = Vec::with_capacity(RecordType::ALL.len());
        for rtype in RecordType::ALL {
            counts.push((rtype, self.count(rtype).await?));
        }
        Ok(counts)
    }

    pub async fn create(
        &self,
        actor: &RequestContext,
        rtype: RecordType,
        form: &HashMap<String, String>,
    ) -> CoreResult<Record> {
        let values = self.prepare(rtype, form)?;

        let txn = self.db.begin().await?;

        if let Some(name) = values.get("name").and_then(FieldValue::as_text) {
            if name_exists(&txn, rtype, name).await? {
                return Err(CoreError::conflict(format!(
                    "A {} record named '{}' already exists",
                    rtype.title(),
                    name
                )));
            }
        }

        let (columns, exprs) = into_columns(rtype, values);
        let insert = Query::insert()
            .into_table(Alias::new(rtype.table_name()))
            .columns(columns)
            .values(exprs)
            .map_err(|err| CoreError::internal(format!("Failed to build insert: {}", err)))?
            .to_owned();

        let backend = txn.get_database_backend();
        let result = txn.execute(backend.build(&insert)).await?;
        let id = i32::try_from(result.last_insert_id())
            .map_err(|_| CoreError::internal("Inserted id out of range"))?;

        let record = fetch_record(&txn, rtype, id)
            .await?
            .ok_or_else(|| CoreError::internal(format!("{} {} vanished after insert", rtype.title(), id)))?;

        record_entry(
            &txn,
            actor,
            AuditAction::Create,
            rtype.table_name(),
            Some(record.snapshot_label()),
        )
        .await?;
        txn.commit().await?;

        info!("{} created {} {}", actor.username, rtype.slug(), record.id);
        Ok(record)
    }

    /// Replaces every non-`id` column with the submitted values and persists
    /// the status derived at save time.
    pub async fn update(
        &self,
        actor: &RequestContext,
        rtype: RecordType,
        id: i32,
        form: &HashMap<String, String>,
    ) -> CoreResult<Record> {
        let txn = self.db.begin().await?;

        if fetch_record(&txn, rtype, id).await?.is_none() {
            return Err(CoreError::not_found(rtype.title(), id.to_string()));
        }

        let values = self.prepare(rtype, form)?;
        let (columns, exprs) = into_columns(rtype, values);
        let update = Query::update()
            .table(Alias::new(rtype.table_name()))
            .values(columns.into_iter().zip(exprs))
            .and_where(Expr::col(Alias::new("id")).eq(id))
            .to_owned();

        let backend = txn.get_database_backend();
        txn.execute(backend.build(&update)).await?;

        let record = fetch_record(&txn, rtype, id)
            .await?
            .ok_or_else(|| CoreError::not_found(rtype.title(), id.to_string()))?;

        record_entry(
            &txn,
            actor,
            AuditAction::Update,
            rtype.table_name(),
            Some(record.snapshot_label()),
        )
        .await?;
        txn.commit().await?;

        info!("{} updated {} {}", actor.username, rtype.slug(), id);
        Ok(record)
    }

    /// Hard delete. The audit entry keeps a snapshot label of the row.
    pub async fn delete(&self, actor: &RequestContext, rtype: RecordType, id: i32) -> CoreResult<Record> {
        let txn = self.db.begin().await?;

        let record = fetch_record(&txn, rtype, id)
            .await?
            .ok_or_else(|| CoreError::not_found(rtype.title(), id.to_string()))?;

        let delete = Query::delete()
            .from_table(Alias::new(rtype.table_name()))
            .and_where(Expr::col(Alias::new("id")).eq(id))
            .to_owned();
        let backend = txn.get_database_backend();
        txn.execute(backend.build(&delete)).await?;

        record_entry(
            &txn,
            actor,
            AuditAction::Delete,
            rtype.table_name(),
            Some(record.snapshot_label()),
        )
        .await?;
        txn.commit().await?;

        info!("{} deleted {} {}", actor.username, rtype.slug(), id);
        Ok(record)
    }

    /// Coerces, checks required columns, and derives the status.
    fn prepare(
        &self,
        rtype: RecordType,
        form: &HashMap<String, String>,
    ) -> CoreResult<IndexMap<String, FieldValue>> {
        let values = coerce_form(rtype, form, self.policy)?;
        validate_required(rtype, &values)?;

        let mut draft = Record {
            record_type: rtype,
            id: 0,
            values,
        };
        draft.refresh_status(today_utc());
        Ok(draft.values)
    }
}

pub fn validate_required(rtype: RecordType, values: &IndexMap<String, FieldValue>) -> CoreResult<()> {
    for column in rtype
        .columns()
        .iter()
        .filter(|column| column.is_required() && !column.is_primary_key())
    {
        let missing = values.get(column.name).map_or(true, FieldValue::is_null);
        if missing {
            return Err(CoreError::invalid_field(
                column.name,
                format!("{} is required", humanize(column.name)),
            ));
        }
    }
    Ok(())
}

fn into_columns(rtype: RecordType, values: IndexMap<String, FieldValue>) -> (Vec<Alias>, Vec<SimpleExpr>) {
    values
        .into_iter()
        .filter_map(|(name, value)| {
            rtype
                .column(&name)
                .map(|column| (Alias::new(name), SimpleExpr::Value(value.into_db_value(column.kind))))
        })
        .unzip()
}

async fn query_records<C>(
    conn: &C,
    rtype: RecordType,
    statement: &SelectStatement,
) -> CoreResult<Vec<Record>>
where
    C: ConnectionTrait,
{
    let rows = conn
        .query_all(conn.get_database_backend().build(statement))
        .await?;
    let today = today_utc();

    rows.iter()
        .map(|row| -> CoreResult<Record> {
            let mut record = Record::from_row(rtype, row)?;
            record.refresh_status(today);
            Ok(record)
        })
        .collect()
}

pub(crate) async fn fetch_record<C>(conn: &C, rtype: RecordType, id: i32) -> CoreResult<Option<Record>>
where
    C: ConnectionTrait,
{
    let statement = select_record(rtype, id);
    let row = conn
        .query_one(conn.get_database_backend().build(&statement))
        .await?;
    row.map(|row| Record::from_row(rtype, &row).map_err(CoreError::from))
        .transpose()
}

async fn count_matching<C>(conn: &C, rtype: RecordType, filter: &RecordFilter) -> CoreResult<u64>
where
    C: ConnectionTrait,
{
    let statement = count_records(rtype, filter);
    let row = conn
        .query_one(conn.get_database_backend().build(&statement))
        .await?;
    let total: i64 = match row {
        Some(row) => row.try_get("", "total")?,
        None => 0,
    };
    Ok(u64::try_from(total).unwrap_or(0))
}

async fn name_exists<C>(conn: &C, rtype: RecordType, name: &str) -> CoreResult<bool>
where
    C: ConnectionTrait,
{
    if !rtype.has_column("name") {
        return Ok(false);
    }

    let statement = Query::select()
        .expr_as(Expr::cust("COUNT(*)"), Alias::new("total"))
        .from(Alias::new(rtype.table_name()))
        .and_where(Expr::col(Alias::new("name")).eq(name))
        .to_owned();
    let row = conn
        .query_one(conn.get_database_backend().build(&statement))
        .await?;
    let total: i64 = match row {
        Some(row) => row.try_get("", "total")?,
        None => 0,
    };
    Ok(total > 0)
}
