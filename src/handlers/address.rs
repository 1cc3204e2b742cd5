use crate::middlewares::current_user;
use crate::models::*;
use crate::services::AddressService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/addresses",
    tag = "address",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取地址列表成功", body = Vec<AddressResponse>),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_addresses(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match address_service.list_addresses(user.id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/addresses",
    tag = "address",
    request_body = AddressInput,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "创建地址成功", body = AddressResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    request: web::Json<AddressInput>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match address_service.create_address(user.id, &request).await {
        Ok(address) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": address
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/addresses/{id}",
    tag = "address",
    params(("id" = i64, Path, description = "地址ID")),
    request_body = AddressInput,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "修改地址成功", body = AddressResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "地址不存在")
    )
)]
pub async fn update_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AddressInput>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match address_service
        .update_address(user.id, path.into_inner(), &request)
        .await
    {
        Ok(address) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": address
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/addresses/{id}",
    tag = "address",
    params(("id" = i64, Path, description = "地址ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "地址不存在")
    )
)]
pub async fn delete_address(
    address_service: web::Data<AddressService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match address_service
        .delete_address(user.id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": null
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn address_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/addresses")
            .route("", web::get().to(list_addresses))
            .route("", web::post().to(create_address))
            .route("/{id}", web::put().to(update_address))
            .route("/{id}", web::delete().to(delete_address)),
    );
}
