pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_products;
mod m20250901_000002_create_cart_and_addresses;
mod m20250901_000003_create_orders;
mod m20250901_000004_create_payment_and_shipping;
mod m20250902_000001_create_refund_requests;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_products::Migration),
            Box::new(m20250901_000002_create_cart_and_addresses::Migration),
            Box::new(m20250901_000003_create_orders::Migration),
            Box::new(m20250901_000004_create_payment_and_shipping::Migration),
            Box::new(m20250902_000001_create_refund_requests::Migration),
        ]
    }
}
