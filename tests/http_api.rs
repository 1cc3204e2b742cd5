mod common;

use actix_web::{App, test, web};
use bananina_backend::config::UploadConfig;
use bananina_backend::handlers;
use bananina_backend::middlewares::AuthMiddleware;
use bananina_backend::services::*;
use bananina_backend::utils::JwtService;
use common::*;
use serde_json::Value;

macro_rules! app {
    ($db:expr, $jwt:expr, $uploads:expr) => {
        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new($jwt.clone()))
                .app_data(web::Data::new(ProductService::new($db.clone())))
                .app_data(web::Data::new(CartService::new($db.clone())))
                .app_data(web::Data::new(AddressService::new($db.clone())))
                .app_data(web::Data::new(OrderService::new($db.clone())))
                .app_data(web::Data::new(PaymentService::new($db.clone(), &$uploads)))
                .app_data(web::Data::new(AdminOrderService::new($db.clone())))
                .configure(handlers::extractor_config)
                .service(
                    web::scope("/api/v1")
                        .configure(handlers::product_config)
                        .configure(handlers::cart_config)
                        .configure(handlers::address_config)
                        .configure(handlers::order_config)
                        .configure(handlers::admin_config),
                ),
        )
        .await
    };
}

fn jwt() -> JwtService {
    JwtService::new("test-secret", 3600)
}

fn bearer(jwt: &JwtService, user_id: i64, is_admin: bool) -> (&'static str, String) {
    let token = jwt.generate_access_token(user_id, is_admin).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn products_are_public_and_orders_need_a_token() {
    let db = setup_db().await;
    seed_product(&db, "Kaos Polos", 100_000, Some(80_000), 5).await;
    let jwt = jwt();
    let app = app!(db, jwt, UploadConfig::default());

    let req = test::TestRequest::get().uri("/api/v1/products").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["items"][0]["name"], "Kaos Polos");
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let req = test::TestRequest::get().uri("/api/v1/orders").to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.as_response_error().status_code(), 401);
}

#[actix_web::test]
async fn customer_cannot_reach_admin_routes() {
    let db = setup_db().await;
    let jwt = jwt();
    let app = app!(db, jwt, UploadConfig::default());

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/orders")
        .insert_header(bearer(&jwt, CUSTOMER, false))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "forbidden");

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/orders")
        .insert_header(bearer(&jwt, ADMIN, true))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn checkout_over_http_uses_error_envelope() {
    let db = setup_db().await;
    let p = seed_product(&db, "Topi", 50_000, None, 1).await;
    let jwt = jwt();
    let app = app!(db, jwt, UploadConfig::default());

    let req = test::TestRequest::post()
        .uri("/api/v1/cart/add")
        .insert_header(bearer(&jwt, CUSTOMER, false))
        .set_json(serde_json::json!({ "product_id": p.id, "quantity": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "insufficient_stock");

    let req = test::TestRequest::post()
        .uri("/api/v1/cart/add")
        .insert_header(bearer(&jwt, CUSTOMER, false))
        .set_json(serde_json::json!({ "product_id": p.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::post()
        .uri("/api/v1/orders/create")
        .insert_header(bearer(&jwt, CUSTOMER, false))
        .set_json(serde_json::json!({
            "shipping_address": address_input(),
            "payment_method": "e-wallet"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "pending_payment");
    assert_eq!(body["data"]["payment_method"], "e-wallet");
    let order_id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/orders/{order_id}"))
        .insert_header(bearer(&jwt, OTHER_CUSTOMER, false))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "not_found");
}

#[actix_web::test]
async fn malformed_requests_use_error_envelope() {
    let db = setup_db().await;
    let jwt = jwt();
    let app = app!(db, jwt, UploadConfig::default());

    let req = test::TestRequest::post()
        .uri("/api/v1/orders/create")
        .insert_header(bearer(&jwt, CUSTOMER, false))
        .set_json(serde_json::json!({
            "shipping_address": address_input(),
            "payment_method": "cash"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "validation_error");

    let req = test::TestRequest::put()
        .uri("/api/v1/admin/orders/1/update-status")
        .insert_header(bearer(&jwt, ADMIN, true))
        .set_json(serde_json::json!({ "status": "lost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "validation_error");

    let req = test::TestRequest::post()
        .uri("/api/v1/orders/1/refund")
        .insert_header(bearer(&jwt, CUSTOMER, false))
        .set_json(serde_json::json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "validation_error");

    let req = test::TestRequest::get()
        .uri("/api/v1/orders/abc")
        .insert_header(bearer(&jwt, CUSTOMER, false))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "validation_error");

    let req = test::TestRequest::get()
        .uri("/api/v1/products?page=first")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "validation_error");
}
