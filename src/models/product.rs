use crate::entities::product_entity;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub effective_price: i64,
    pub stock: i32,
    pub in_stock: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub search: Option<String>,
}

impl From<product_entity::Model> for ProductResponse {
    fn from(m: product_entity::Model) -> Self {
        Self {
            effective_price: m.effective_price(),
            in_stock: m.stock > 0,
            id: m.id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            price: m.price,
            sale_price: m.sale_price,
            stock: m.stock,
        }
    }
}
