use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum PaymentDetails {
    Table,
    Id,
    OrderId,
    PaymentMethod,
    TransferProofUrl,
    PaymentAmount,
    PaymentDate,
    VerifiedBy,
    VerifiedAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ShippingDetails {
    Table,
    Id,
    OrderId,
    CourierName,
    ServiceType,
    TrackingNumber,
    ShippingCost,
    EstimatedDeliveryDate,
    ShippedBy,
    ShippedAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderStatusHistory {
    Table,
    Id,
    OrderId,
    Status,
    Notes,
    ChangedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 订单附属记录:
/// - payment_details / shipping_details 与订单一对一（order_id 唯一）
/// - order_status_history 只追加，不更新不删除
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentDetails::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentDetails::OrderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentDetails::PaymentMethod)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentDetails::TransferProofUrl)
                            .string_len(512)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PaymentDetails::PaymentAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentDetails::PaymentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(PaymentDetails::VerifiedBy).big_integer().null())
                    .col(
                        ColumnDef::new(PaymentDetails::VerifiedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(PaymentDetails::Notes).text().null())
                    .col(
                        ColumnDef::new(PaymentDetails::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PaymentDetails::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_details_order")
                            .from(PaymentDetails::Table, PaymentDetails::OrderId)
                            .to(Orders::Table, Orders::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_payment_details_order")
                    .table(PaymentDetails::Table)
                    .col(PaymentDetails::OrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ShippingDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShippingDetails::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShippingDetails::OrderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShippingDetails::CourierName)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShippingDetails::ServiceType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShippingDetails::TrackingNumber)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShippingDetails::ShippingCost)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ShippingDetails::EstimatedDeliveryDate)
                            .date()
                            .null(),
                    )
                    .col(ColumnDef::new(ShippingDetails::ShippedBy).big_integer().null())
                    .col(
                        ColumnDef::new(ShippingDetails::ShippedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(ShippingDetails::Notes).text().null())
                    .col(
                        ColumnDef::new(ShippingDetails::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShippingDetails::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipping_details_order")
                            .from(ShippingDetails::Table, ShippingDetails::OrderId)
                            .to(Orders::Table, Orders::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_shipping_details_order")
                    .table(ShippingDetails::Table)
                    .col(ShippingDetails::OrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderStatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderStatusHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusHistory::OrderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusHistory::Status)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrderStatusHistory::Notes).text().null())
                    .col(
                        ColumnDef::new(OrderStatusHistory::ChangedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_status_history_order")
                            .from(OrderStatusHistory::Table, OrderStatusHistory::OrderId)
                            .to(Orders::Table, Orders::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_order_status_history_order")
                    .table(OrderStatusHistory::Table)
                    .col(OrderStatusHistory::OrderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(OrderStatusHistory::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ShippingDetails::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PaymentDetails::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
