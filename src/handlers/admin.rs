use crate::entities::OrderStatus;
use crate::middlewares::require_admin;
use crate::models::*;
use crate::services::AdminOrderService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/orders",
    tag = "admin",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("per_page" = Option<u64>, Query, description = "每页数量"),
        ("status" = Option<OrderStatus>, Query, description = "订单状态"),
        ("search" = Option<String>, Query, description = "订单号搜索")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取订单列表成功"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_orders(
    admin_service: web::Data<AdminOrderService>,
    req: HttpRequest,
    query: web::Query<AdminOrderQuery>,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    match admin_service.list_orders(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/orders/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "订单ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取订单详情成功", body = OrderDetailResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn get_order(
    admin_service: web::Data<AdminOrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    match admin_service.get_order(path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/orders/{id}/update-status",
    tag = "admin",
    params(("id" = i64, Path, description = "订单ID")),
    request_body = UpdateStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "状态已更新", body = OrderDetailResponse),
        (status = 400, description = "非法的状态迁移"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn update_status(
    admin_service: web::Data<AdminOrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse> {
    let admin = require_admin(&req)?;

    match admin_service
        .update_status(admin.id, path.into_inner(), &request)
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
    put,
    path = "/admin/orders/{id}/verify-payment",
    tag = "admin",
    params(("id" = i64, Path, description = "订单ID")),
    request_body(content = VerifyPaymentRequest, description = "可选"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "付款已核验", body = OrderDetailResponse),
        (status = 400, description = "订单不在待核验状态"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn verify_payment(
    admin_service: web::Data<AdminOrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: Option<web::Json<VerifyPaymentRequest>>,
) -> Result<HttpResponse> {
    let admin = require_admin(&req)?;
    let notes = request.and_then(|r| r.into_inner().notes);

    match admin_service
        .verify_payment(admin.id, path.into_inner(), notes)
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
    path = "/admin/orders/{id}/update-shipping",
    tag = "admin",
    params(("id" = i64, Path, description = "订单ID")),
    request_body = ShippingInput,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "发货信息已更新", body = OrderDetailResponse),
        (status = 400, description = "当前状态不能发货"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn update_shipping(
    admin_service: web::Data<AdminOrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ShippingInput>,
) -> Result<HttpResponse> {
    let admin = require_admin(&req)?;

    match admin_service
        .update_shipping(admin.id, path.into_inner(), &request)
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
    put,
    path = "/admin/orders/{id}/refund/approve",
    tag = "admin",
    params(("id" = i64, Path, description = "订单ID")),
    request_body(content = ResolveRefundRequest, description = "可选"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "退款已通过", body = OrderDetailResponse),
        (status = 400, description = "没有待处理的退款申请")
    )
)]
pub async fn approve_refund(
    admin_service: web::Data<AdminOrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: Option<web::Json<ResolveRefundRequest>>,
) -> Result<HttpResponse> {
    let admin = require_admin(&req)?;
    let notes = request.and_then(|r| r.into_inner().admin_notes);

    match admin_service
        .approve_refund(admin.id, path.into_inner(), notes)
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
    put,
    path = "/admin/orders/{id}/refund/reject",
    tag = "admin",
    params(("id" = i64, Path, description = "订单ID")),
    request_body(content = ResolveRefundRequest, description = "可选"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "退款已驳回，订单恢复原状态", body = OrderDetailResponse),
        (status = 400, description = "没有待处理的退款申请")
    )
)]
pub async fn reject_refund(
    admin_service: web::Data<AdminOrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: Option<web::Json<ResolveRefundRequest>>,
) -> Result<HttpResponse> {
    let admin = require_admin(&req)?;
    let notes = request.and_then(|r| r.into_inner().admin_notes);

    match admin_service
        .reject_refund(admin.id, path.into_inner(), notes)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/orders")
            .route("", web::get().to(list_orders))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/update-status", web::put().to(update_status))
            .route("/{id}/verify-payment", web::put().to(verify_payment))
            .route("/{id}/update-shipping", web::post().to(update_shipping))
            .route("/{id}/refund/approve", web::put().to(approve_refund))
            .route("/{id}/refund/reject", web::put().to(reject_refund)),
    );
}
