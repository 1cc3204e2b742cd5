use std::collections::HashMap;

use chrono::{Local, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{
    OrderStatus, RefundStatus, address_entity as addresses, cart_item_entity as cart_items,
    order_entity as orders, order_item_entity as order_items,
    order_sequence_entity as order_sequences, order_status_history_entity as history,
    payment_detail_entity as payments, product_entity as products,
    refund_request_entity as refunds, shipping_detail_entity as shippings,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateOrderRequest, CreateOrderResponse, OrderDetailResponse, OrderQuery, OrderSummary,
    PaginatedResponse, PaginationParams, RefundRequestResponse,
};
use crate::services::address_service::{snapshot_from_input, snapshot_from_saved, validate_address};
use crate::services::order_state::{ActorRole, ensure_transition};
use crate::services::order_transition::{apply_transition, record_history};
use crate::utils::{day_key, format_order_number};

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 由购物车创建订单
    ///
    /// 1. 生成地址快照
    /// 2. 读取购物车，空车报 InvalidState
    /// 3. 逐个商品重新校验上架状态和库存
    /// 4. 取当天订单号序列
    /// 5. 写订单、明细、首条流水，按条件扣减库存（stock >= qty）
    /// 6. 清空购物车
    ///
    /// 全部在一个事务里，任何一步失败都整体回滚。
    pub async fn create_order(
        &self,
        user_id: i64,
        req: &CreateOrderRequest,
    ) -> AppResult<CreateOrderResponse> {
        // 先做无副作用的校验
        if let Some(inline) = &req.shipping_address {
            validate_address(inline)?;
        } else if req.shipping_address_id.is_none() {
            return Err(AppError::ValidationError(
                "shipping_address or shipping_address_id is required".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        let address = match (&req.shipping_address, req.shipping_address_id) {
            (Some(inline), _) => snapshot_from_input(&txn, user_id, inline).await?,
            (None, Some(id)) => snapshot_from_saved(&txn, user_id, id).await?,
            (None, None) => {
                return Err(AppError::ValidationError(
                    "shipping_address or shipping_address_id is required".to_string(),
                ));
            }
        };

        let lines = cart_items::Entity::find()
            .filter(cart_items::Column::UserId.eq(user_id))
            .order_by_asc(cart_items::Column::Id)
            .all(&txn)
            .await?;
        if lines.is_empty() {
            return Err(AppError::InvalidState("Cart is empty".to_string()));
        }

        let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
        let product_map: HashMap<i64, products::Model> = products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut priced = Vec::with_capacity(lines.len());
        for line in &lines {
            if line.quantity <= 0 {
                return Err(AppError::ValidationError(format!(
                    "Invalid quantity {} for product #{} in cart",
                    line.quantity, line.product_id
                )));
            }
            let product = product_map.get(&line.product_id).ok_or_else(|| {
                AppError::InsufficientStock {
                    product: format!("product #{}", line.product_id),
                }
            })?;
            if !product.is_purchasable() || product.stock < line.quantity {
                return Err(AppError::InsufficientStock {
                    product: product.name.clone(),
                });
            }
            priced.push((product, line.quantity, product.effective_price()));
        }

        let subtotal: i64 = priced
            .iter()
            .map(|(_, qty, price)| price * i64::from(*qty))
            .sum();
        let shipping_cost = 0;
        let order_number = next_order_number(&txn).await?;
        let now = Utc::now();

        let order = orders::ActiveModel {
            order_number: Set(order_number.clone()),
            user_id: Set(user_id),
            shipping_address_id: Set(address.id),
            total_amount: Set(subtotal + shipping_cost),
            shipping_cost: Set(shipping_cost),
            payment_method: Set(req.payment_method),
            status: Set(OrderStatus::PendingPayment),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let items: Vec<order_items::ActiveModel> = priced
            .iter()
            .map(|(product, qty, price)| order_items::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(product.id),
                product_name: Set(product.name.clone()),
                quantity: Set(*qty),
                price: Set(*price),
                created_at: Set(Some(now)),
                ..Default::default()
            })
            .collect();
        order_items::Entity::insert_many(items).exec(&txn).await?;

        record_history(
            &txn,
            order.id,
            OrderStatus::PendingPayment,
            Some("Order created".to_string()),
            user_id,
            now,
        )
        .await?;

        // 条件扣减，防止并发下单超卖
        for (product, qty, _) in &priced {
            let res = products::Entity::update_many()
                .col_expr(
                    products::Column::Stock,
                    Expr::col(products::Column::Stock).sub(*qty),
                )
                .col_expr(products::Column::UpdatedAt, Expr::value(now))
                .filter(products::Column::Id.eq(product.id))
                .filter(products::Column::Stock.gte(*qty))
                .exec(&txn)
                .await?;
            if res.rows_affected == 0 {
                return Err(AppError::InsufficientStock {
                    product: product.name.clone(),
                });
            }
        }

        cart_items::Entity::delete_many()
            .filter(cart_items::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        log::info!(
            "Order {order_number} created by user {user_id}, total {}",
            order.total_amount
        );

        Ok(CreateOrderResponse {
            id: order.id,
            order_number: order.order_number,
            status: order.status,
            payment_method: order.payment_method,
            subtotal,
            shipping_cost: order.shipping_cost,
            total_amount: order.total_amount,
            item_count: priced.iter().map(|(_, qty, _)| *qty).sum(),
        })
    }

    /// 用户订单列表，按创建时间倒序
    pub async fn list_orders(
        &self,
        user_id: i64,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderSummary>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = orders::Entity::find().filter(orders::Column::UserId.eq(user_id));
        if let Some(status) = query.status {
            base_query = base_query.filter(orders::Column::Status.eq(status));
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

    /// 订单详情；不属于该用户的订单按不存在处理
    pub async fn get_order(&self, user_id: i64, order_id: i64) -> AppResult<OrderDetailResponse> {
        let order = find_owned_order(&self.pool, user_id, order_id).await?;
        load_order_detail(&self.pool, order).await
    }

    pub async fn cancel_order(
        &self,
        user_id: i64,
        order_id: i64,
        notes: Option<String>,
    ) -> AppResult<OrderDetailResponse> {
        let txn = self.pool.begin().await?;
        let order = find_owned_order(&txn, user_id, order_id).await?;

        let notes = notes.or_else(|| Some("Cancelled by customer".to_string()));
        let updated = apply_transition(
            &txn,
            &order,
            OrderStatus::Cancelled,
            ActorRole::Customer,
            user_id,
            notes,
            None,
        )
        .await?;
        txn.commit().await?;

        load_order_detail(&self.pool, updated).await
    }

    /// 申请退款：订单进入 refund_requested，由管理员审核
    pub async fn request_refund(
        &self,
        user_id: i64,
        order_id: i64,
        reason: &str,
    ) -> AppResult<RefundRequestResponse> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::ValidationError(
                "Refund reason is required".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        let order = find_owned_order(&txn, user_id, order_id).await?;
        ensure_transition(order.status, OrderStatus::RefundRequested, ActorRole::Customer)?;

        let has_payment = payments::Entity::find()
            .filter(payments::Column::OrderId.eq(order.id))
            .count(&txn)
            .await?
            > 0;
        if !has_payment {
            return Err(AppError::InvalidState(
                "Order has no payment to refund".to_string(),
            ));
        }

        let now = Utc::now();
        let refund = refunds::ActiveModel {
            order_id: Set(order.id),
            user_id: Set(user_id),
            reason: Set(reason.to_string()),
            status: Set(RefundStatus::Pending),
            amount: Set(order.total_amount),
            previous_status: Set(order.status),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        apply_transition(
            &txn,
            &order,
            OrderStatus::RefundRequested,
            ActorRole::Customer,
            user_id,
            Some(format!("Refund requested: {reason}")),
            None,
        )
        .await?;
        txn.commit().await?;

        Ok(refund.into())
    }
}

/// 当天订单号：按天计数器原子自增（INSERT ... ON CONFLICT DO UPDATE），
/// 再在同一事务内读回
async fn next_order_number<C: ConnectionTrait>(txn: &C) -> AppResult<String> {
    let today = Local::now().date_naive();
    let day = day_key(today);

    let seed = order_sequences::ActiveModel {
        day: Set(day.clone()),
        last_seq: Set(1),
    };
    order_sequences::Entity::insert(seed)
        .on_conflict(
            OnConflict::column(order_sequences::Column::Day)
                .value(
                    order_sequences::Column::LastSeq,
                    Expr::col((order_sequences::Entity, order_sequences::Column::LastSeq)).add(1),
                )
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;

    let seq = order_sequences::Entity::find_by_id(day)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::InternalError("Order sequence row missing".to_string()))?;

    Ok(format_order_number(today, seq.last_seq))
}

pub(crate) async fn find_owned_order<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    order_id: i64,
) -> AppResult<orders::Model> {
    orders::Entity::find_by_id(order_id)
        .filter(orders::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

pub(crate) async fn find_order<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
) -> AppResult<orders::Model> {
    orders::Entity::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// 列表项附带商品件数
pub(crate) async fn summarize_orders<C: ConnectionTrait>(
    conn: &C,
    list: Vec<orders::Model>,
) -> AppResult<Vec<OrderSummary>> {
    let ids: Vec<i64> = list.iter().map(|o| o.id).collect();
    let mut counts: HashMap<i64, i32> = HashMap::new();
    if !ids.is_empty() {
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(ids))
            .all(conn)
            .await?;
        for item in items {
            *counts.entry(item.order_id).or_default() += item.quantity;
        }
    }

    Ok(list
        .into_iter()
        .map(|o| OrderSummary {
            item_count: counts.get(&o.id).copied().unwrap_or(0),
            id: o.id,
            order_number: o.order_number,
            user_id: o.user_id,
            status: o.status,
            payment_method: o.payment_method,
            total_amount: o.total_amount,
            created_at: o.created_at,
        })
        .collect())
}

/// 组装订单详情：明细、地址快照、支付、发货、流水、退款申请
pub(crate) async fn load_order_detail<C: ConnectionTrait>(
    conn: &C,
    order: orders::Model,
) -> AppResult<OrderDetailResponse> {
    let order_id = order.id;
    let address_id = order.shipping_address_id;
    let mut detail = OrderDetailResponse::from_order(order);

    detail.items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .order_by_asc(order_items::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    detail.shipping_address = addresses::Entity::find_by_id(address_id)
        .one(conn)
        .await?
        .map(Into::into);

    detail.payment = payments::Entity::find()
        .filter(payments::Column::OrderId.eq(order_id))
        .one(conn)
        .await?
        .map(Into::into);

    detail.shipping = shippings::Entity::find()
        .filter(shippings::Column::OrderId.eq(order_id))
        .one(conn)
        .await?
        .map(Into::into);

    detail.history = history::Entity::find()
        .filter(history::Column::OrderId.eq(order_id))
        .order_by_asc(history::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    detail.refund_requests = refunds::Entity::find()
        .filter(refunds::Column::OrderId.eq(order_id))
        .order_by_asc(refunds::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(detail)
}
