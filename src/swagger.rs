use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{OrderStatus, PaymentMethod, RefundStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::product::list_products,
        handlers::product::get_product,
        handlers::cart::get_cart,
        handlers::cart::add_to_cart,
        handlers::cart::update_cart,
        handlers::cart::remove_from_cart,
        handlers::address::list_addresses,
        handlers::address::create_address,
        handlers::address::update_address,
        handlers::address::delete_address,
        handlers::order::create_order,
        handlers::order::get_orders,
        handlers::order::get_order,
        handlers::order::cancel_order,
        handlers::order::upload_payment,
        handlers::order::request_refund,
        handlers::admin::list_orders,
        handlers::admin::get_order,
        handlers::admin::update_status,
        handlers::admin::verify_payment,
        handlers::admin::update_shipping,
        handlers::admin::approve_refund,
        handlers::admin::reject_refund,
    ),
    components(
        schemas(
            OrderStatus,
            PaymentMethod,
            RefundStatus,
            ProductResponse,
            AddToCartRequest,
            UpdateCartRequest,
            CartItemResponse,
            CartResponse,
            AddressInput,
            AddressResponse,
            CreateOrderRequest,
            CreateOrderResponse,
            OrderSummary,
            OrderItemResponse,
            PaymentDetailResponse,
            ShippingDetailResponse,
            StatusHistoryResponse,
            RefundRequestResponse,
            OrderDetailResponse,
            CancelOrderRequest,
            RefundOrderRequest,
            PaymentProofForm,
            PaymentUploadResponse,
            ShippingInput,
            UpdateStatusRequest,
            VerifyPaymentRequest,
            ResolveRefundRequest,
            PaginationInfo,
            ErrorResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "product", description = "Product catalog API"),
        (name = "cart", description = "Shopping cart API"),
        (name = "address", description = "Address book API"),
        (name = "order", description = "Order lifecycle API"),
        (name = "admin", description = "Admin order management API"),
    ),
    info(
        title = "Bananina Backend API",
        version = "1.0.0",
        description = "Storefront order backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_core_order_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/orders/create",
            "/orders/{id}/upload-payment",
            "/admin/orders/{id}/update-status",
            "/admin/orders/{id}/refund/approve",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
