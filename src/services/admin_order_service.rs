use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

use crate::entities::{
    OrderStatus, RefundStatus, order_entity as orders, refund_request_entity as refunds,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdminOrderQuery, OrderDetailResponse, OrderSummary, PaginatedResponse, PaginationParams,
    ShippingInput, UpdateStatusRequest,
};
use crate::services::order_service::{find_order, load_order_detail, summarize_orders};
use crate::services::order_state::ActorRole;
use crate::services::order_transition::{apply_transition, upsert_shipping, validate_shipping};

/// 管理员订单操作，调用方负责确认身份为管理员
#[derive(Clone)]
pub struct AdminOrderService {
    pool: DatabaseConnection,
}

impl AdminOrderService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_orders(
        &self,
        query: &AdminOrderQuery,
    ) -> AppResult<PaginatedResponse<OrderSummary>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = orders::Entity::find();
        if let Some(status) = query.status {
            base_query = base_query.filter(orders::Column::Status.eq(status));
        }
        if let Some(search) = query.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            base_query = base_query.filter(orders::Column::OrderNumber.contains(search));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let list = base_query
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .limit(params.get_per_page())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let items = summarize_orders(&self.pool, list).await?;
        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn get_order(&self, order_id: i64) -> AppResult<OrderDetailResponse> {
        let order = find_order(&self.pool, order_id).await?;
        load_order_detail(&self.pool, order).await
    }

    /// 通用改状态。退款申请中的订单必须走退款审核接口
    pub async fn update_status(
        &self,
        admin_id: i64,
        order_id: i64,
        req: &UpdateStatusRequest,
    ) -> AppResult<OrderDetailResponse> {
        let txn = self.pool.begin().await?;
        let order = find_order(&txn, order_id).await?;

        if order.status == OrderStatus::RefundRequested {
            return Err(AppError::InvalidState(
                "Refund request must be approved or rejected through the refund endpoints"
                    .to_string(),
            ));
        }

        let updated = apply_transition(
            &txn,
            &order,
            req.status,
            ActorRole::Admin,
            admin_id,
            req.notes.clone(),
            req.shipping.as_ref(),
        )
        .await?;
        txn.commit().await?;

        load_order_detail(&self.pool, updated).await
    }

    /// 核验付款凭证：payment_uploaded -> payment_verified
    pub async fn verify_payment(
        &self,
        admin_id: i64,
        order_id: i64,
        notes: Option<String>,
    ) -> AppResult<OrderDetailResponse> {
        let txn = self.pool.begin().await?;
        let order = find_order(&txn, order_id).await?;

        let notes = notes.or_else(|| Some("Payment verified".to_string()));
        let updated = apply_transition(
            &txn,
            &order,
            OrderStatus::PaymentVerified,
            ActorRole::Admin,
            admin_id,
            notes,
            None,
        )
        .await?;
        txn.commit().await?;

        load_order_detail(&self.pool, updated).await
    }

    /// 填写发货信息
    ///
    /// - processing: 迁移到 shipped 并写入发货信息
    /// - shipped: 只更新发货信息，不写流水
    pub async fn update_shipping(
        &self,
        admin_id: i64,
        order_id: i64,
        input: &ShippingInput,
    ) -> AppResult<OrderDetailResponse> {
        let txn = self.pool.begin().await?;
        let order = find_order(&txn, order_id).await?;

        let updated = match order.status {
            OrderStatus::Processing => {
                let notes = input
                    .notes
                    .clone()
                    .or_else(|| Some(format!("Shipped via {}", input.courier_name.trim())));
                apply_transition(
                    &txn,
                    &order,
                    OrderStatus::Shipped,
                    ActorRole::Admin,
                    admin_id,
                    notes,
                    Some(input),
                )
                .await?
            }
            OrderStatus::Shipped => {
                validate_shipping(input)?;
                let now = Utc::now();
                upsert_shipping(&txn, order.id, input, admin_id, now, false).await?;
                orders::Entity::update_many()
                    .col_expr(orders::Column::UpdatedAt, Expr::value(now))
                    .filter(orders::Column::Id.eq(order.id))
                    .exec(&txn)
                    .await?;
                order
            }
            from => {
                return Err(AppError::IllegalTransition {
                    from,
                    to: OrderStatus::Shipped,
                });
            }
        };
        txn.commit().await?;

        load_order_detail(&self.pool, updated).await
    }

    pub async fn approve_refund(
        &self,
        admin_id: i64,
        order_id: i64,
        admin_notes: Option<String>,
    ) -> AppResult<OrderDetailResponse> {
        self.resolve_refund(admin_id, order_id, RefundStatus::Approved, admin_notes)
            .await
    }

    pub async fn reject_refund(
        &self,
        admin_id: i64,
        order_id: i64,
        admin_notes: Option<String>,
    ) -> AppResult<OrderDetailResponse> {
        self.resolve_refund(admin_id, order_id, RefundStatus::Rejected, admin_notes)
            .await
    }

    /// 通过 -> refunded；驳回 -> 回到申请退款前的状态。退款不回补库存
    async fn resolve_refund(
        &self,
        admin_id: i64,
        order_id: i64,
        decision: RefundStatus,
        admin_notes: Option<String>,
    ) -> AppResult<OrderDetailResponse> {
        let txn = self.pool.begin().await?;
        let order = find_order(&txn, order_id).await?;

        let refund = refunds::Entity::find()
            .filter(refunds::Column::OrderId.eq(order.id))
            .filter(refunds::Column::Status.eq(RefundStatus::Pending))
            .order_by_desc(refunds::Column::Id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState("No pending refund request for this order".to_string())
            })?;

        let now = Utc::now();
        let res = refunds::Entity::update_many()
            .col_expr(refunds::Column::Status, Expr::value(decision))
            .col_expr(refunds::Column::ResolvedBy, Expr::value(admin_id))
            .col_expr(refunds::Column::ResolvedAt, Expr::value(now))
            .col_expr(refunds::Column::AdminNotes, Expr::value(admin_notes.clone()))
            .col_expr(refunds::Column::UpdatedAt, Expr::value(now))
            .filter(refunds::Column::Id.eq(refund.id))
            .filter(refunds::Column::Status.eq(RefundStatus::Pending))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::InvalidState(
                "Refund request was resolved by another request".to_string(),
            ));
        }

        let (target, default_note) = match decision {
            RefundStatus::Approved => (OrderStatus::Refunded, "Refund approved"),
            _ => (refund.previous_status, "Refund rejected"),
        };
        let notes = admin_notes.or_else(|| Some(default_note.to_string()));

        let updated = apply_transition(
            &txn,
            &order,
            target,
            ActorRole::Admin,
            admin_id,
            notes,
            None,
        )
        .await?;
        txn.commit().await?;

        log::info!(
            "Refund request {} for order {} {decision} by admin {admin_id}",
            refund.id,
            updated.order_number
        );

        load_order_detail(&self.pool, updated).await
    }
}
