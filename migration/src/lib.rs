pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_stores;
mod m20250301_000002_create_items;
mod m20250301_000003_create_price_history;
mod m20250315_000001_create_purchases;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_stores::Migration),
            Box::new(m20250301_000002_create_items::Migration),
            Box::new(m20250301_000003_create_price_history::Migration),
            Box::new(m20250315_000001_create_purchases::Migration),
        ]
    }
}
