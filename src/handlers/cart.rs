use crate::middlewares::current_user;
use crate::models::*;
use crate::services::CartService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取购物车成功", body = CartResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_cart(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match cart_service.get_cart(user.id).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cart
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/cart/add",
    tag = "cart",
    request_body = AddToCartRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "加入购物车成功", body = CartResponse),
        (status = 400, description = "数量不合法或库存不足"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn add_to_cart(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    request: web::Json<AddToCartRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match cart_service.add_item(user.id, &request).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cart
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/cart/update",
    tag = "cart",
    request_body = UpdateCartRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "更新购物车成功", body = CartResponse),
        (status = 400, description = "数量不合法或库存不足"),
        (status = 404, description = "购物车中没有该商品")
    )
)]
pub async fn update_cart(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    request: web::Json<UpdateCartRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match cart_service.update_item(user.id, &request).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cart
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cart/{product_id}",
    tag = "cart",
    params(("product_id" = i64, Path, description = "商品ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "移除成功", body = CartResponse),
        (status = 404, description = "购物车中没有该商品")
    )
)]
pub async fn remove_from_cart(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match cart_service.remove_item(user.id, path.into_inner()).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cart
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("", web::get().to(get_cart))
            .route("/add", web::post().to(add_to_cart))
            .route("/update", web::put().to(update_cart))
            .route("/{product_id}", web::delete().to(remove_from_cart)),
    );
}
