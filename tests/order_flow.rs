mod common;

use bananina_backend::entities::{
    OrderStatus, order_entity as orders, order_item_entity as order_items,
    order_status_history_entity as history,
};
use bananina_backend::error::AppError;
use bananina_backend::models::{OrderQuery, ShippingInput, UpdateStatusRequest};
use bananina_backend::services::order_state::{ActorRole, can_transition};
use bananina_backend::services::{AdminOrderService, CartService, OrderService};
use common::*;
use sea_orm::{ColumnTrait, EntityTrait, Iterable, PaginatorTrait, QueryFilter, QueryOrder};

fn shipping() -> ShippingInput {
    ShippingInput {
        courier_name: "JNE".to_string(),
        service_type: "REG".to_string(),
        tracking_number: "JNE0012345".to_string(),
        shipping_cost: Some(18_000),
        estimated_delivery_date: None,
        notes: None,
    }
}

async fn history_of(db: &sea_orm::DatabaseConnection, order_id: i64) -> Vec<OrderStatus> {
    history::Entity::find()
        .filter(history::Column::OrderId.eq(order_id))
        .order_by_asc(history::Column::Id)
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.status)
        .collect()
}

#[tokio::test]
async fn create_order_snapshots_prices_and_clears_cart() {
    let db = setup_db().await;
    let kaos = seed_product(&db, "Kaos Polos", 100_000, Some(80_000), 5).await;
    let topi = seed_product(&db, "Topi", 50_000, None, 3).await;
    put_in_cart(&db, CUSTOMER, kaos.id, 2).await;
    put_in_cart(&db, CUSTOMER, topi.id, 1).await;

    let svc = OrderService::new(db.clone());
    let created = svc.create_order(CUSTOMER, &order_request()).await.unwrap();

    assert_eq!(created.status, OrderStatus::PendingPayment);
    assert_eq!(created.total_amount, 2 * 80_000 + 50_000);
    assert_eq!(created.item_count, 3);
    assert!(created.order_number.starts_with("ORD"));
    assert!(created.order_number.ends_with("0001"));

    assert_eq!(stock_of(&db, kaos.id).await, 3);
    assert_eq!(stock_of(&db, topi.id).await, 2);

    let cart = CartService::new(db.clone()).get_cart(CUSTOMER).await.unwrap();
    assert!(cart.items.is_empty());

    let detail = svc.get_order(CUSTOMER, created.id).await.unwrap();
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].price, 80_000);
    assert_eq!(detail.history.len(), 1);
    assert_eq!(detail.history[0].status, OrderStatus::PendingPayment);
    let address = detail.shipping_address.unwrap();
    assert_eq!(address.phone, "+6281234567890");

    // 第二单序号递增
    put_in_cart(&db, CUSTOMER, topi.id, 1).await;
    let second = svc.create_order(CUSTOMER, &order_request()).await.unwrap();
    assert!(second.order_number.ends_with("0002"));
    assert_eq!(&second.order_number[..11], &created.order_number[..11]);
}

#[tokio::test]
async fn empty_cart_cannot_be_ordered() {
    let db = setup_db().await;
    let svc = OrderService::new(db.clone());
    let err = svc.create_order(CUSTOMER, &order_request()).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn failed_order_leaves_no_trace() {
    let db = setup_db().await;
    let a = seed_product(&db, "Kemeja", 120_000, None, 5).await;
    let b = seed_product(&db, "Celana", 150_000, None, 1).await;
    put_in_cart(&db, CUSTOMER, a.id, 2).await;
    put_in_cart(&db, CUSTOMER, b.id, 2).await;

    let svc = OrderService::new(db.clone());
    let err = svc.create_order(CUSTOMER, &order_request()).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { .. }));

    assert_eq!(orders::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(order_items::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(stock_of(&db, a.id).await, 5);
    assert_eq!(stock_of(&db, b.id).await, 1);
    let cart = CartService::new(db.clone()).get_cart(CUSTOMER).await.unwrap();
    assert_eq!(cart.items.len(), 2);
}

#[tokio::test]
async fn cancel_restores_stock_exactly_once() {
    let db = setup_db().await;
    let p = seed_product(&db, "Jaket", 300_000, None, 4).await;
    put_in_cart(&db, CUSTOMER, p.id, 3).await;

    let svc = OrderService::new(db.clone());
    let created = svc.create_order(CUSTOMER, &order_request()).await.unwrap();
    assert_eq!(stock_of(&db, p.id).await, 1);

    let cancelled = svc.cancel_order(CUSTOMER, created.id, None).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&db, p.id).await, 4);

    let err = svc.cancel_order(CUSTOMER, created.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
    assert_eq!(stock_of(&db, p.id).await, 4);

    assert_eq!(
        history_of(&db, created.id).await,
        vec![OrderStatus::PendingPayment, OrderStatus::Cancelled]
    );
}

#[tokio::test]
async fn concurrent_orders_never_oversell() {
    let db = setup_db().await;
    let p = seed_product(&db, "Edisi Terbatas", 500_000, None, 1).await;
    put_in_cart(&db, CUSTOMER, p.id, 1).await;
    put_in_cart(&db, OTHER_CUSTOMER, p.id, 1).await;

    let svc = OrderService::new(db.clone());
    let (s1, s2) = (svc.clone(), svc.clone());
    let t1 = tokio::spawn(async move { s1.create_order(CUSTOMER, &order_request()).await });
    let t2 = tokio::spawn(async move { s2.create_order(OTHER_CUSTOMER, &order_request()).await });
    let r1 = t1.await.unwrap();
    let r2 = t2.await.unwrap();

    let ok = [r1.is_ok(), r2.is_ok()].iter().filter(|x| **x).count();
    assert_eq!(ok, 1);
    let failed = if r1.is_err() { r1.unwrap_err() } else { r2.unwrap_err() };
    assert!(matches!(failed, AppError::InsufficientStock { .. }));
    assert_eq!(stock_of(&db, p.id).await, 0);
}

#[tokio::test]
async fn other_users_orders_are_not_found() {
    let db = setup_db().await;
    let order = seed_order(&db, CUSTOMER, OrderStatus::PendingPayment, false).await;
    let svc = OrderService::new(db.clone());

    let err = svc.get_order(OTHER_CUSTOMER, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = svc.cancel_order(OTHER_CUSTOMER, order.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let page = svc
        .list_orders(
            OTHER_CUSTOMER,
            &OrderQuery {
                page: None,
                per_page: None,
                status: None,
            },
        )
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn admin_status_updates_follow_transition_table() {
    let db = setup_db().await;
    let admin = AdminOrderService::new(db.clone());

    for from in OrderStatus::iter() {
        if from == OrderStatus::RefundRequested {
            continue;
        }
        for to in OrderStatus::iter() {
            let order = seed_order(&db, CUSTOMER, from, true).await;
            let req = UpdateStatusRequest {
                status: to,
                notes: None,
                shipping: Some(shipping()),
            };
            let result = admin.update_status(ADMIN, order.id, &req).await;
            let stored = orders::Entity::find_by_id(order.id)
                .one(&db)
                .await
                .unwrap()
                .unwrap();

            if can_transition(from, to, ActorRole::Admin) {
                let detail = result.unwrap_or_else(|e| panic!("{from} -> {to}: {e}"));
                assert_eq!(detail.status, to);
                assert_eq!(stored.status, to);
                assert_eq!(history_of(&db, order.id).await, vec![to]);
            } else {
                assert!(
                    matches!(result, Err(AppError::IllegalTransition { .. })),
                    "{from} -> {to} should be rejected"
                );
                assert_eq!(stored.status, from);
                assert!(history_of(&db, order.id).await.is_empty());
            }
        }
    }
}

#[tokio::test]
async fn shipped_order_cannot_be_cancelled() {
    let db = setup_db().await;
    let order = seed_order(&db, CUSTOMER, OrderStatus::Shipped, true).await;

    let err = OrderService::new(db.clone())
        .cancel_order(CUSTOMER, order.id, None)
        .await
        .unwrap_err();
    match err {
        AppError::IllegalTransition { from, to } => {
            assert_eq!(from, OrderStatus::Shipped);
            assert_eq!(to, OrderStatus::Cancelled);
        }
        other => panic!("unexpected error: {other}"),
    }

    let req = UpdateStatusRequest {
        status: OrderStatus::Cancelled,
        notes: None,
        shipping: None,
    };
    let err = AdminOrderService::new(db.clone())
        .update_status(ADMIN, order.id, &req)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
}

#[tokio::test]
async fn shipping_requires_details_and_can_be_corrected() {
    let db = setup_db().await;
    let order = seed_order(&db, CUSTOMER, OrderStatus::Processing, true).await;
    let admin = AdminOrderService::new(db.clone());

    let req = UpdateStatusRequest {
        status: OrderStatus::Shipped,
        notes: None,
        shipping: None,
    };
    let err = admin.update_status(ADMIN, order.id, &req).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let detail = admin.update_shipping(ADMIN, order.id, &shipping()).await.unwrap();
    assert_eq!(detail.status, OrderStatus::Shipped);
    let info = detail.shipping.unwrap();
    assert_eq!(info.tracking_number, "JNE0012345");
    assert_eq!(info.shipped_by, Some(ADMIN));

    // 已发货时只修正单号，不产生流水
    let mut fixed = shipping();
    fixed.tracking_number = "JNE0099999".to_string();
    let detail = admin.update_shipping(ADMIN, order.id, &fixed).await.unwrap();
    assert_eq!(detail.status, OrderStatus::Shipped);
    assert_eq!(detail.shipping.unwrap().tracking_number, "JNE0099999");
    assert_eq!(history_of(&db, order.id).await, vec![OrderStatus::Shipped]);

    let delivered = seed_order(&db, CUSTOMER, OrderStatus::Delivered, true).await;
    let err = admin
        .update_shipping(ADMIN, delivered.id, &shipping())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
}

#[tokio::test]
async fn history_tracks_every_status_change() {
    let db = setup_db().await;
    let p = seed_product(&db, "Sepatu", 400_000, None, 2).await;
    put_in_cart(&db, CUSTOMER, p.id, 1).await;
    let created = OrderService::new(db.clone())
        .create_order(CUSTOMER, &order_request())
        .await
        .unwrap();

    // 未上传凭证不能核验
    let admin = AdminOrderService::new(db.clone());
    let err = admin.verify_payment(ADMIN, created.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
    assert_eq!(
        history_of(&db, created.id).await,
        vec![OrderStatus::PendingPayment]
    );

    let seeded = seed_order(&db, CUSTOMER, OrderStatus::PaymentUploaded, true).await;
    let verified = admin.verify_payment(ADMIN, seeded.id, None).await.unwrap();
    assert!(verified.payment.unwrap().verified);

    for status in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        let req = UpdateStatusRequest {
            status,
            notes: None,
            shipping: Some(shipping()),
        };
        let detail = admin.update_status(ADMIN, seeded.id, &req).await.unwrap();
        assert_eq!(detail.status, status);
        assert_eq!(detail.history.last().map(|h| h.status), Some(status));
    }
    assert_eq!(
        history_of(&db, seeded.id).await,
        vec![
            OrderStatus::PaymentVerified,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ]
    );
}
