use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 单个商品在购物车中的数量上限
pub const MAX_CART_LINE_QUANTITY: i32 = 10;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    pub product_id: i64,
    /// 小于等于 0 时移除该行
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItemResponse {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub line_total: i64,
    pub stock: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub item_count: i32,
    pub subtotal: i64,
}
