mod common;

use std::path::Path;

use bananina_backend::config::UploadConfig;
use bananina_backend::entities::{
    OrderStatus, RefundStatus, payment_detail_entity as payments, product_entity as products,
};
use bananina_backend::error::AppError;
use bananina_backend::models::UpdateStatusRequest;
use bananina_backend::services::{AdminOrderService, OrderService, PaymentService};
use common::*;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

fn upload_config(dir: &Path) -> UploadConfig {
    UploadConfig {
        dir: dir.to_string_lossy().into_owned(),
        public_prefix: "/assets/uploads/payments".to_string(),
        max_bytes: 5 * 1024 * 1024,
        max_dimension: 1200,
    }
}

/// 上传目录里的凭证文件（忽略暂存目录）
fn proof_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|it| {
            it.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| !n.starts_with('.'))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_anything_is_written() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let order = seed_order(&db, CUSTOMER, OrderStatus::PendingPayment, false).await;
    let svc = PaymentService::new(db.clone(), &upload_config(dir.path()));

    let mut bytes = png_bytes(4, 4);
    bytes.resize(6 * 1024 * 1024, 0);
    let err = svc
        .upload_payment_proof(CUSTOMER, order.id, bytes)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    assert_eq!(payments::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let order = seed_order(&db, CUSTOMER, OrderStatus::PendingPayment, false).await;
    let svc = PaymentService::new(db.clone(), &upload_config(dir.path()));

    let err = svc
        .upload_payment_proof(CUSTOMER, order.id, b"%PDF-1.4 not an image".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(proof_files(dir.path()).is_empty());
}

#[tokio::test]
async fn upload_moves_order_forward_and_reupload_replaces_file() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let order = seed_order(&db, CUSTOMER, OrderStatus::PendingPayment, false).await;
    let svc = PaymentService::new(db.clone(), &upload_config(dir.path()));

    let first = svc
        .upload_payment_proof(CUSTOMER, order.id, png_bytes(2400, 600))
        .await
        .unwrap();
    assert_eq!(first.status, OrderStatus::PaymentUploaded);
    assert!(first.transfer_proof_url.starts_with("/assets/uploads/payments/payment_"));
    let files = proof_files(dir.path());
    assert_eq!(files.len(), 1);

    // 长边被缩到 1200
    let stored = image::open(dir.path().join(&files[0])).unwrap();
    assert_eq!((stored.width(), stored.height()), (1200, 300));

    let second = svc
        .upload_payment_proof(CUSTOMER, order.id, png_bytes(10, 10))
        .await
        .unwrap();
    assert_eq!(second.status, OrderStatus::PaymentUploaded);
    assert_ne!(second.transfer_proof_url, first.transfer_proof_url);

    let files = proof_files(dir.path());
    assert_eq!(files.len(), 1);
    assert!(second.transfer_proof_url.ends_with(&files[0]));

    let rows = payments::Entity::find()
        .filter(payments::Column::OrderId.eq(order.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].transfer_proof_url.as_deref(),
        Some(second.transfer_proof_url.as_str())
    );
    assert_eq!(rows[0].payment_amount, order.total_amount);

    let detail = OrderService::new(db.clone())
        .get_order(CUSTOMER, order.id)
        .await
        .unwrap();
    let statuses: Vec<_> = detail.history.iter().map(|h| h.status).collect();
    assert_eq!(statuses, vec![OrderStatus::PaymentUploaded]);
}

#[tokio::test]
async fn upload_checks_owner_and_status() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let svc = PaymentService::new(db.clone(), &upload_config(dir.path()));

    let order = seed_order(&db, CUSTOMER, OrderStatus::PendingPayment, false).await;
    let err = svc
        .upload_payment_proof(OTHER_CUSTOMER, order.id, png_bytes(8, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // 归属检查先于文件检查
    let err = svc
        .upload_payment_proof(OTHER_CUSTOMER, order.id, b"not an image".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = svc
        .upload_payment_proof(OTHER_CUSTOMER, order.id, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let verified = seed_order(&db, CUSTOMER, OrderStatus::PaymentVerified, true).await;
    let err = svc
        .upload_payment_proof(CUSTOMER, verified.id, png_bytes(8, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let err = svc
        .upload_payment_proof(CUSTOMER, 9_999, png_bytes(8, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert!(proof_files(dir.path()).is_empty());
}

#[tokio::test]
async fn admin_verifies_uploaded_payment() {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let p = seed_product(&db, "Tas Kanvas", 90_000, None, 5).await;
    put_in_cart(&db, CUSTOMER, p.id, 1).await;
    let created = OrderService::new(db.clone())
        .create_order(CUSTOMER, &order_request())
        .await
        .unwrap();

    PaymentService::new(db.clone(), &upload_config(dir.path()))
        .upload_payment_proof(CUSTOMER, created.id, png_bytes(32, 32))
        .await
        .unwrap();

    let detail = AdminOrderService::new(db.clone())
        .verify_payment(ADMIN, created.id, Some("Transfer BCA cocok".to_string()))
        .await
        .unwrap();

    assert_eq!(detail.status, OrderStatus::PaymentVerified);
    let payment = detail.payment.unwrap();
    assert!(payment.verified);
    assert_eq!(payment.verified_by, Some(ADMIN));
    assert_eq!(payment.notes.as_deref(), Some("Transfer BCA cocok"));
    let statuses: Vec<_> = detail.history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::PendingPayment,
            OrderStatus::PaymentUploaded,
            OrderStatus::PaymentVerified,
        ]
    );
}

#[tokio::test]
async fn refund_approval_marks_order_refunded_without_restocking() {
    let db = setup_db().await;
    let p = seed_product(&db, "Dompet", 75_000, None, 3).await;
    put_in_cart(&db, CUSTOMER, p.id, 2).await;
    let created = OrderService::new(db.clone())
        .create_order(CUSTOMER, &order_request())
        .await
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    PaymentService::new(db.clone(), &upload_config(dir.path()))
        .upload_payment_proof(CUSTOMER, created.id, png_bytes(16, 16))
        .await
        .unwrap();
    let admin = AdminOrderService::new(db.clone());
    admin.verify_payment(ADMIN, created.id, None).await.unwrap();

    let orders = OrderService::new(db.clone());
    let err = orders.request_refund(CUSTOMER, created.id, "  ").await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let refund = orders
        .request_refund(CUSTOMER, created.id, "Barang tidak sesuai")
        .await
        .unwrap();
    assert_eq!(refund.status, RefundStatus::Pending);
    assert_eq!(refund.previous_status, OrderStatus::PaymentVerified);
    assert_eq!(refund.amount, created.total_amount);

    // 退款审核中的订单不能走通用改状态
    let req = UpdateStatusRequest {
        status: OrderStatus::Refunded,
        notes: None,
        shipping: None,
    };
    let err = admin.update_status(ADMIN, created.id, &req).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let detail = admin
        .approve_refund(ADMIN, created.id, Some("Dana dikembalikan".to_string()))
        .await
        .unwrap();
    assert_eq!(detail.status, OrderStatus::Refunded);
    assert_eq!(detail.refund_requests.len(), 1);
    assert_eq!(detail.refund_requests[0].status, RefundStatus::Approved);
    assert_eq!(detail.refund_requests[0].resolved_by, Some(ADMIN));

    let stock = products::Entity::find_by_id(p.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap()
        .stock;
    assert_eq!(stock, 1);

    let err = admin.approve_refund(ADMIN, created.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn refund_rejection_restores_previous_status() {
    let db = setup_db().await;
    let order = seed_order(&db, CUSTOMER, OrderStatus::Shipped, true).await;
    let orders = OrderService::new(db.clone());
    let admin = AdminOrderService::new(db.clone());

    orders
        .request_refund(CUSTOMER, order.id, "Paket belum sampai")
        .await
        .unwrap();
    let detail = admin.reject_refund(ADMIN, order.id, None).await.unwrap();
    assert_eq!(detail.status, OrderStatus::Shipped);
    assert_eq!(detail.refund_requests[0].status, RefundStatus::Rejected);
    let statuses: Vec<_> = detail.history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        vec![OrderStatus::RefundRequested, OrderStatus::Shipped]
    );

    // 未付款的订单不能申请退款
    let unpaid = seed_order(&db, CUSTOMER, OrderStatus::PendingPayment, false).await;
    let err = orders
        .request_refund(CUSTOMER, unpaid.id, "Berubah pikiran")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));
}
