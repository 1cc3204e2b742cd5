use crate::entities::OrderStatus;
use crate::error::{AppError, AppResult};
use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{OrderService, PaymentService};
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use futures_util::TryStreamExt;
use serde_json::json;

pub const PAYMENT_PROOF_FIELD: &str = "payment_proof";

#[utoipa::path(
    post,
    path = "/orders/create",
    tag = "order",
    request_body = CreateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "下单成功", body = CreateOrderResponse),
        (status = 400, description = "购物车为空、地址不合法或库存不足"),
        (status = 404, description = "地址不存在")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match order_service.create_order(user.id, &request).await {
        Ok(order) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("per_page" = Option<u64>, Query, description = "每页数量"),
        ("status" = Option<OrderStatus>, Query, description = "订单状态")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取订单列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match order_service.list_orders(user.id, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "订单ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取订单详情成功", body = OrderDetailResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match order_service.get_order(user.id, path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{id}/cancel",
    tag = "order",
    params(("id" = i64, Path, description = "订单ID")),
    request_body(content = CancelOrderRequest, description = "可选"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "取消成功", body = OrderDetailResponse),
        (status = 400, description = "当前状态不能取消"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn cancel_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: Option<web::Json<CancelOrderRequest>>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    let notes = request.and_then(|r| r.into_inner().notes);

    match order_service
        .cancel_order(user.id, path.into_inner(), notes)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/{id}/upload-payment",
    tag = "order",
    params(("id" = i64, Path, description = "订单ID")),
    request_body(content = PaymentProofForm, content_type = "multipart/form-data", description = "JPEG/PNG，不超过 5MB"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "上传成功", body = PaymentUploadResponse),
        (status = 400, description = "文件不合法或订单状态不允许"),
        (status = 403, description = "不是订单所有者"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn upload_payment(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;
    let order_id = path.into_inner();

    if let Err(e) = payment_service.ensure_can_upload(user.id, order_id).await {
        return Ok(e.error_response());
    }

    let bytes = match read_proof_field(payload, payment_service.max_bytes()).await {
        Ok(bytes) => bytes,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service
        .upload_payment_proof(user.id, order_id, bytes)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 读取 payment_proof 字段，超过上限立即停止读取
async fn read_proof_field(mut payload: Multipart, max_bytes: usize) -> AppResult<Vec<u8>> {
    let malformed = |e: actix_multipart::MultipartError| {
        AppError::ValidationError(format!("Malformed multipart body: {e}"))
    };

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        if field.name() != PAYMENT_PROOF_FIELD {
            while field.try_next().await.map_err(malformed)?.is_some() {}
            continue;
        }

        let mut buf = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            if buf.len() + chunk.len() > max_bytes {
                return Err(AppError::ValidationError(format!(
                    "File size exceeds the {}MB limit",
                    max_bytes / (1024 * 1024)
                )));
            }
            buf.extend_from_slice(&chunk);
        }
        return Ok(buf);
    }

    Err(AppError::ValidationError(
        "Payment proof file is required".to_string(),
    ))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/refund",
    tag = "order",
    params(("id" = i64, Path, description = "订单ID")),
    request_body = RefundOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "退款申请已提交", body = RefundRequestResponse),
        (status = 400, description = "原因为空或当前状态不能退款"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn request_refund(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<RefundOrderRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match order_service
        .request_refund(user.id, path.into_inner(), &request.reason)
        .await
    {
        Ok(refund) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": refund
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(get_orders))
            .route("/create", web::post().to(create_order))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/cancel", web::put().to(cancel_order))
            .route("/{id}/upload-payment", web::post().to(upload_payment))
            .route("/{id}/refund", web::post().to(request_refund)),
    );
}
