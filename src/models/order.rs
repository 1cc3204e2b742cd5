use crate::entities::{
    OrderStatus, PaymentMethod, RefundStatus, order_entity, order_item_entity,
    order_status_history_entity, payment_detail_entity, refund_request_entity,
    shipping_detail_entity,
};
use crate::models::{AddressInput, AddressResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 下单：shipping_address_id 与 shipping_address 二选一
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub shipping_address_id: Option<i64>,
    pub shipping_address: Option<AddressInput>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub total_amount: i64,
    pub item_count: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminOrderQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<OrderStatus>,
    /// 按订单号模糊搜索
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
    pub item_count: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: i64,
    pub line_total: i64,
}

impl From<order_item_entity::Model> for OrderItemResponse {
    fn from(m: order_item_entity::Model) -> Self {
        Self {
            line_total: m.price * i64::from(m.quantity),
            product_id: m.product_id,
            product_name: m.product_name,
            quantity: m.quantity,
            price: m.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentDetailResponse {
    pub payment_method: PaymentMethod,
    pub transfer_proof_url: Option<String>,
    pub payment_amount: i64,
    pub payment_date: Option<DateTime<Utc>>,
    pub verified: bool,
    pub verified_by: Option<i64>,
    pub verified_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl From<payment_detail_entity::Model> for PaymentDetailResponse {
    fn from(m: payment_detail_entity::Model) -> Self {
        Self {
            verified: m.is_verified(),
            payment_method: m.payment_method,
            transfer_proof_url: m.transfer_proof_url,
            payment_amount: m.payment_amount,
            payment_date: m.payment_date,
            verified_by: m.verified_by,
            verified_at: m.verified_at,
            notes: m.notes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShippingDetailResponse {
    pub courier_name: String,
    pub service_type: String,
    pub tracking_number: String,
    pub shipping_cost: i64,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub shipped_by: Option<i64>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl From<shipping_detail_entity::Model> for ShippingDetailResponse {
    fn from(m: shipping_detail_entity::Model) -> Self {
        Self {
            courier_name: m.courier_name,
            service_type: m.service_type,
            tracking_number: m.tracking_number,
            shipping_cost: m.shipping_cost,
            estimated_delivery_date: m.estimated_delivery_date,
            shipped_by: m.shipped_by,
            shipped_at: m.shipped_at,
            notes: m.notes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusHistoryResponse {
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub changed_by: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<order_status_history_entity::Model> for StatusHistoryResponse {
    fn from(m: order_status_history_entity::Model) -> Self {
        Self {
            status: m.status,
            notes: m.notes,
            changed_by: m.changed_by,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefundRequestResponse {
    pub id: i64,
    pub reason: String,
    pub status: RefundStatus,
    pub amount: i64,
    pub previous_status: OrderStatus,
    pub resolved_by: Option<i64>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<refund_request_entity::Model> for RefundRequestResponse {
    fn from(m: refund_request_entity::Model) -> Self {
        Self {
            id: m.id,
            reason: m.reason,
            status: m.status,
            amount: m.amount,
            previous_status: m.previous_status,
            resolved_by: m.resolved_by,
            resolved_at: m.resolved_at,
            admin_notes: m.admin_notes,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailResponse {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
    pub shipping_cost: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemResponse>,
    pub shipping_address: Option<AddressResponse>,
    pub payment: Option<PaymentDetailResponse>,
    pub shipping: Option<ShippingDetailResponse>,
    pub history: Vec<StatusHistoryResponse>,
    pub refund_requests: Vec<RefundRequestResponse>,
}

impl OrderDetailResponse {
    pub fn from_order(order: order_entity::Model) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            user_id: order.user_id,
            status: order.status,
            payment_method: order.payment_method,
            total_amount: order.total_amount,
            shipping_cost: order.shipping_cost,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: Vec::new(),
            shipping_address: None,
            payment: None,
            shipping: None,
            history: Vec::new(),
            refund_requests: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefundOrderRequest {
    pub reason: String,
}

/// 上传凭证的 multipart 表单，只用于 OpenAPI 文档
#[derive(Debug, ToSchema)]
pub struct PaymentProofForm {
    #[schema(value_type = String, format = Binary)]
    pub payment_proof: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentUploadResponse {
    pub order_id: i64,
    pub status: OrderStatus,
    pub transfer_proof_url: String,
    pub payment_date: DateTime<Utc>,
}

/// 发货信息
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShippingInput {
    pub courier_name: String,
    pub service_type: String,
    pub tracking_number: String,
    pub shipping_cost: Option<i64>,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
    /// 目标状态为 shipped 时必填
    pub shipping: Option<ShippingInput>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResolveRefundRequest {
    pub admin_notes: Option<String>,
}
