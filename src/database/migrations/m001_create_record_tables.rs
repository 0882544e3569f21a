use sea_orm_migration::prelude::*;

use crate::schema::{ColumnKind, ColumnSpec, RecordType};

/// Creates one table per record type straight from the schema registry.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for rtype in RecordType::ALL {
            manager.create_table(create_statement(rtype)).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for rtype in RecordType::ALL {
            manager
                .drop_table(
                    Table::drop()
                        .table(Alias::new(rtype.table_name()))
                        .if_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

pub fn create_statement(rtype: RecordType) -> TableCreateStatement {
    let mut table = Table::create();
    table.table(Alias::new(rtype.table_name())).if_not_exists();

    for column in rtype.columns() {
        table.col(&mut column_def(column));
    }
    table.to_owned()
}

fn column_def(column: &ColumnSpec) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(column.name));

    if column.is_primary_key() {
        def.integer().not_null().auto_increment().primary_key();
        return def;
    }

    match column.kind {
        ColumnKind::Integer => def.integer(),
        ColumnKind::Float => def.double(),
        ColumnKind::Text { max_len } => def.string_len(max_len),
        ColumnKind::Date => def.date(),
    };

    if !column.nullable {
        def.not_null();
    }
    if let Some(default) = column.default {
        def.default(default);
    }
    def
}
