use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum RefundRequests {
    Table,
    Id,
    OrderId,
    UserId,
    Reason,
    Status,
    Amount,
    PreviousStatus,
    ResolvedBy,
    ResolvedAt,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RefundRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RefundRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RefundRequests::OrderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RefundRequests::UserId).big_integer().not_null())
                    .col(ColumnDef::new(RefundRequests::Reason).text().not_null())
                    .col(
                        ColumnDef::new(RefundRequests::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RefundRequests::Amount).big_integer().not_null())
                    // 申请退款时订单所处状态，驳回后恢复
                    .col(
                        ColumnDef::new(RefundRequests::PreviousStatus)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RefundRequests::ResolvedBy).big_integer().null())
                    .col(
                        ColumnDef::new(RefundRequests::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(RefundRequests::AdminNotes).text().null())
                    .col(
                        ColumnDef::new(RefundRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RefundRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_refund_requests_order")
                            .from(RefundRequests::Table, RefundRequests::OrderId)
                            .to(Orders::Table, Orders::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_refund_requests_order")
                    .table(RefundRequests::Table)
                    .col(RefundRequests::OrderId)
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
                    .table(RefundRequests::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
