pub mod address;
pub mod admin;
pub mod cart;
pub mod order;
pub mod product;

pub use address::address_config;
pub use admin::admin_config;
pub use cart::cart_config;
pub use order::order_config;
pub use product::product_config;

use crate::error::AppError;
use actix_web::web;

/// 请求体、查询参数、路径参数解析失败时也返回统一的错误结构
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    );
}
