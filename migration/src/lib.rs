pub use sea_orm_migration::prelude::*;

mod m20251006_000001_create_users;
mod m20251006_000002_create_enquiries;
mod m20251006_000003_create_admissions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251006_000001_create_users::Migration),
            Box::new(m20251006_000002_create_enquiries::Migration),
            Box::new(m20251006_000003_create_admissions::Migration),
        ]
    }
}
