use sea_orm_migration::prelude::*;

pub mod m001_create_record_tables;
mod m002_create_user_tables;
mod m003_create_activity_log;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m001_create_record_tables::Migration),
            Box::new(m002_create_user_tables::Migration),
            Box::new(m003_create_activity_log::Migration),
        ]
    }
}
