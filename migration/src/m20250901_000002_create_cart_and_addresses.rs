use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum CartItems {
    Table,
    Id,
    UserId,
    ProductId,
    Quantity,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    UserId,
    Label,
    RecipientName,
    Phone,
    StreetAddress,
    District,
    City,
    Province,
    PostalCode,
    AdditionalInfo,
    IsSnapshot,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 购物车
        manager
            .create_table(
                Table::create()
                    .table(CartItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CartItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CartItems::UserId).big_integer().not_null())
                    .col(ColumnDef::new(CartItems::ProductId).big_integer().not_null())
                    .col(ColumnDef::new(CartItems::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(CartItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CartItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_items_product")
                            .from(CartItems::Table, CartItems::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个用户每个商品只有一行
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_cart_items_user_product")
                    .table(CartItems::Table)
                    .col(CartItems::UserId)
                    .col(CartItems::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 地址簿 + 订单地址快照（is_snapshot = true）
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addresses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Addresses::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Addresses::Label).string_len(64).null())
                    .col(
                        ColumnDef::new(Addresses::RecipientName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Addresses::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(Addresses::StreetAddress).text().not_null())
                    .col(ColumnDef::new(Addresses::District).string_len(128).not_null())
                    .col(ColumnDef::new(Addresses::City).string_len(128).not_null())
                    .col(ColumnDef::new(Addresses::Province).string_len(128).not_null())
                    .col(ColumnDef::new(Addresses::PostalCode).string_len(16).not_null())
                    .col(ColumnDef::new(Addresses::AdditionalInfo).text().null())
                    .col(
                        ColumnDef::new(Addresses::IsSnapshot)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Addresses::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Addresses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_addresses_user")
                    .table(Addresses::Table)
                    .col(Addresses::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Addresses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(CartItems::Table).to_owned())
            .await?;
        Ok(())
    }
}
