use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_marketplace_tables::Migration),
            Box::new(m20250101_000002_create_lookup_indexes::Migration),
        ]
    }
}

mod m20250101_000001_create_marketplace_tables {
    use sea_orm::{EntityTrait, Schema};
    use sea_orm_migration::prelude::*;

    use crate::entity::{AuditLogs, CartItems, Notifications, Orders, Products, Users};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_marketplace_tables"
        }
    }

    async fn create<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager
            .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
            .await
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Parents before children so foreign keys resolve.
            create(manager, Users).await?;
            create(manager, Products).await?;
            create(manager, CartItems).await?;
            create(manager, Orders).await?;
            create(manager, Notifications).await?;
            create(manager, AuditLogs).await?;
            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuditLogs).if_exists().to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Notifications).if_exists().to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders).if_exists().to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CartItems).if_exists().to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products).if_exists().to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users).if_exists().to_owned())
                .await?;
            Ok(())
        }
    }
}

mod m20250101_000002_create_lookup_indexes {
    use sea_orm_migration::prelude::*;

    use crate::entity::{cart_items, notifications, products};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_lookup_indexes"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // One cart entry per (buyer, product).
            manager
                .create_index(
                    Index::create()
                        .name("ux_cart_items_buyer_product")
                        .table(cart_items::Entity)
                        .col(cart_items::Column::BuyerId)
                        .col(cart_items::Column::ProductId)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("ix_notifications_order_id")
                        .table(notifications::Entity)
                        .col(notifications::Column::OrderId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("ix_products_status_created_at")
                        .table(products::Entity)
                        .col(products::Column::Status)
                        .col(products::Column::CreatedAt)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for (name, table) in [
                ("ux_cart_items_buyer_product", "cart_items"),
                ("ix_notifications_order_id", "notifications"),
                ("ix_products_status_created_at", "products"),
            ] {
                manager
                    .drop_index(Index::drop().name(name).table(Alias::new(table)).to_owned())
                    .await?;
            }
            Ok(())
        }
    }
}
