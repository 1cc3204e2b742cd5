//! 状态迁移的执行：校验、比较并交换状态列、写流水、副作用，全部在调用方的事务里完成。

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};

use crate::entities::{
    OrderStatus, order_entity as orders, order_item_entity as order_items,
    order_status_history_entity as history, payment_detail_entity as payments,
    product_entity as products, shipping_detail_entity as shippings,
};
use crate::error::{AppError, AppResult};
use crate::models::ShippingInput;
use crate::services::order_state::{ActorRole, ensure_transition};

/// 执行一次状态迁移
///
/// 状态更新带 `status = 当前状态` 条件，影响 0 行说明订单已被并发修改，
/// 返回 InvalidState；因此同一订单的取消（以及库存回补）最多发生一次。
pub async fn apply_transition<C: ConnectionTrait>(
    txn: &C,
    order: &orders::Model,
    target: OrderStatus,
    role: ActorRole,
    actor_id: i64,
    notes: Option<String>,
    shipping: Option<&ShippingInput>,
) -> AppResult<orders::Model> {
    let from = order.status;
    ensure_transition(from, target, role)?;

    // 退款被驳回回到原状态时不重复发货和核验的副作用
    let restoring = from == OrderStatus::RefundRequested;

    if target == OrderStatus::Shipped && !restoring {
        match shipping {
            Some(input) => validate_shipping(input)?,
            None => {
                return Err(AppError::ValidationError(
                    "Shipping details are required to mark an order as shipped".to_string(),
                ));
            }
        }
    }

    let payment = if target == OrderStatus::PaymentVerified && !restoring {
        let payment = payments::Entity::find()
            .filter(payments::Column::OrderId.eq(order.id))
            .one(txn)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState("No payment has been uploaded for this order".to_string())
            })?;
        Some(payment)
    } else {
        None
    };

    let now = Utc::now();
    let res = orders::Entity::update_many()
        .col_expr(orders::Column::Status, Expr::value(target))
        .col_expr(orders::Column::UpdatedAt, Expr::value(now))
        .filter(orders::Column::Id.eq(order.id))
        .filter(orders::Column::Status.eq(from))
        .exec(txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::InvalidState(
            "Order status was changed by another request".to_string(),
        ));
    }

    record_history(txn, order.id, target, notes.clone(), actor_id, now).await?;

    match target {
        OrderStatus::Cancelled => restore_stock(txn, order.id).await?,
        OrderStatus::PaymentVerified => {
            if let Some(payment) = payment {
                let mut am = payment.into_active_model();
                am.verified_by = Set(Some(actor_id));
                am.verified_at = Set(Some(now));
                if notes.is_some() {
                    am.notes = Set(notes);
                }
                am.updated_at = Set(Some(now));
                am.update(txn).await?;
            }
        }
        OrderStatus::Shipped if !restoring => {
            if let Some(input) = shipping {
                upsert_shipping(txn, order.id, input, actor_id, now, true).await?;
            }
        }
        _ => {}
    }

    log::info!(
        "Order {} moved from {from} to {target} by user {actor_id}",
        order.order_number
    );

    Ok(orders::Model {
        status: target,
        updated_at: Some(now),
        ..order.clone()
    })
}

/// 追加一条状态流水
pub async fn record_history<C: ConnectionTrait>(
    txn: &C,
    order_id: i64,
    status: OrderStatus,
    notes: Option<String>,
    changed_by: i64,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let am = history::ActiveModel {
        order_id: Set(order_id),
        status: Set(status),
        notes: Set(notes),
        changed_by: Set(changed_by),
        created_at: Set(Some(now)),
        ..Default::default()
    };
    history::Entity::insert(am).exec(txn).await?;
    Ok(())
}

/// 把订单每一行的数量加回商品库存
async fn restore_stock<C: ConnectionTrait>(txn: &C, order_id: i64) -> AppResult<()> {
    let items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .all(txn)
        .await?;

    for item in items {
        products::Entity::update_many()
            .col_expr(
                products::Column::Stock,
                Expr::col(products::Column::Stock).add(item.quantity),
            )
            .filter(products::Column::Id.eq(item.product_id))
            .exec(txn)
            .await?;
    }
    Ok(())
}

pub fn validate_shipping(input: &ShippingInput) -> AppResult<()> {
    let required = [
        ("courier_name", &input.courier_name),
        ("service_type", &input.service_type),
        ("tracking_number", &input.tracking_number),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::ValidationError(format!("{field} is required")));
        }
    }
    if input.shipping_cost.is_some_and(|c| c < 0) {
        return Err(AppError::ValidationError(
            "shipping_cost must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// 写入或更新发货信息。stamp_shipped 为 true 时同时记录发货人与时间
pub async fn upsert_shipping<C: ConnectionTrait>(
    txn: &C,
    order_id: i64,
    input: &ShippingInput,
    actor_id: i64,
    now: DateTime<Utc>,
    stamp_shipped: bool,
) -> AppResult<shippings::Model> {
    let existing = shippings::Entity::find()
        .filter(shippings::Column::OrderId.eq(order_id))
        .one(txn)
        .await?;

    let model = match existing {
        Some(row) => {
            let mut am = row.into_active_model();
            am.courier_name = Set(input.courier_name.trim().to_string());
            am.service_type = Set(input.service_type.trim().to_string());
            am.tracking_number = Set(input.tracking_number.trim().to_string());
            if let Some(cost) = input.shipping_cost {
                am.shipping_cost = Set(cost);
            }
            if input.estimated_delivery_date.is_some() {
                am.estimated_delivery_date = Set(input.estimated_delivery_date);
            }
            if input.notes.is_some() {
                am.notes = Set(input.notes.clone());
            }
            if stamp_shipped {
                am.shipped_by = Set(Some(actor_id));
                am.shipped_at = Set(Some(now));
            }
            am.updated_at = Set(Some(now));
            am.update(txn).await?
        }
        None => {
            let am = shippings::ActiveModel {
                order_id: Set(order_id),
                courier_name: Set(input.courier_name.trim().to_string()),
                service_type: Set(input.service_type.trim().to_string()),
                tracking_number: Set(input.tracking_number.trim().to_string()),
                shipping_cost: Set(input.shipping_cost.unwrap_or(0)),
                estimated_delivery_date: Set(input.estimated_delivery_date),
                shipped_by: Set(Some(actor_id)),
                shipped_at: Set(Some(now)),
                notes: Set(input.notes.clone()),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
                ..Default::default()
            };
            am.insert(txn).await?
        }
    };
    Ok(model)
}
