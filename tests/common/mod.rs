#![allow(dead_code)]

use bananina_backend::entities::{
    OrderStatus, PaymentMethod, address_entity as addresses, cart_item_entity as cart_items,
    order_entity as orders, payment_detail_entity as payments, product_entity as products,
};
use bananina_backend::models::{AddressInput, CreateOrderRequest};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

pub const CUSTOMER: i64 = 7;
pub const OTHER_CUSTOMER: i64 = 8;
pub const ADMIN: i64 = 1;

/// 内存库只有一条连接，否则每条连接各自是一个空库
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn seed_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    sale_price: Option<i64>,
    stock: i32,
) -> products::Model {
    let now = Utc::now();
    products::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(name.to_lowercase().replace(' ', "-")),
        description: Set(None),
        price: Set(price),
        sale_price: Set(sale_price),
        stock: Set(stock),
        is_active: Set(true),
        deleted_at: Set(None),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert product")
}

pub async fn stock_of(db: &DatabaseConnection, product_id: i64) -> i32 {
    use sea_orm::EntityTrait;
    products::Entity::find_by_id(product_id)
        .one(db)
        .await
        .expect("query product")
        .expect("product exists")
        .stock
}

pub async fn put_in_cart(db: &DatabaseConnection, user_id: i64, product_id: i64, quantity: i32) {
    let now = Utc::now();
    cart_items::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert cart item");
}

pub fn address_input() -> AddressInput {
    AddressInput {
        label: Some("Rumah".to_string()),
        recipient_name: "Siti Rahma".to_string(),
        phone: "081234567890".to_string(),
        street_address: "Jl. Melati No. 12".to_string(),
        district: "Coblong".to_string(),
        city: "Bandung".to_string(),
        province: "Jawa Barat".to_string(),
        postal_code: "40132".to_string(),
        additional_info: None,
    }
}

pub fn order_request() -> CreateOrderRequest {
    CreateOrderRequest {
        shipping_address_id: None,
        shipping_address: Some(address_input()),
        payment_method: PaymentMethod::BankTransfer,
    }
}

/// 直接写入一个处于指定状态的订单（不经过状态机），带地址快照和付款记录
pub async fn seed_order(
    db: &DatabaseConnection,
    user_id: i64,
    status: OrderStatus,
    with_payment: bool,
) -> orders::Model {
    let now = Utc::now();
    let input = address_input();
    let address = addresses::ActiveModel {
        user_id: Set(user_id),
        label: Set(input.label),
        recipient_name: Set(input.recipient_name),
        phone: Set("+6281234567890".to_string()),
        street_address: Set(input.street_address),
        district: Set(input.district),
        city: Set(input.city),
        province: Set(input.province),
        postal_code: Set(input.postal_code),
        additional_info: Set(None),
        is_snapshot: Set(true),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert address");

    let order = orders::ActiveModel {
        order_number: Set(format!("SEED{}", uuid::Uuid::new_v4().simple())),
        user_id: Set(user_id),
        shipping_address_id: Set(address.id),
        total_amount: Set(150_000),
        shipping_cost: Set(0),
        payment_method: Set(PaymentMethod::BankTransfer),
        status: Set(status),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert order");

    if with_payment {
        payments::ActiveModel {
            order_id: Set(order.id),
            payment_method: Set(PaymentMethod::BankTransfer),
            transfer_proof_url: Set(Some("/assets/uploads/payments/seed.jpg".to_string())),
            payment_amount: Set(order.total_amount),
            payment_date: Set(Some(now)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert payment");
    }

    order
}

/// 生成一张 w x h 的 PNG
pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 120, 40, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageOutputFormat::Png)
        .expect("encode png");
    out.into_inner()
}
