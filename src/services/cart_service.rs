use crate::entities::{cart_item_entity as cart_items, product_entity as products};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddToCartRequest, CartItemResponse, CartResponse, MAX_CART_LINE_QUANTITY, UpdateCartRequest,
};
use chrono::Utc;
use std::collections::HashMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

/// 购物车。这里的库存检查只是提示性的，不占用库存；
/// 下单时会在事务内重新校验。
#[derive(Clone)]
pub struct CartService {
    pool: DatabaseConnection,
}

impl CartService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_cart(&self, user_id: i64) -> AppResult<CartResponse> {
        let lines = cart_items::Entity::find()
            .filter(cart_items::Column::UserId.eq(user_id))
            .order_by_asc(cart_items::Column::Id)
            .all(&self.pool)
            .await?;

        let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
        let product_map: HashMap<i64, products::Model> = products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // 已下架的商品仍然显示，下单时再报错
        let items: Vec<CartItemResponse> = lines
            .into_iter()
            .filter_map(|line| {
                let product = product_map.get(&line.product_id)?;
                let unit_price = product.effective_price();
                Some(CartItemResponse {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    unit_price,
                    quantity: line.quantity,
                    line_total: unit_price * i64::from(line.quantity),
                    stock: product.stock,
                })
            })
            .collect();

        Ok(CartResponse {
            item_count: items.iter().map(|i| i.quantity).sum(),
            subtotal: items.iter().map(|i| i.line_total).sum(),
            items,
        })
    }

    pub async fn add_item(&self, user_id: i64, req: &AddToCartRequest) -> AppResult<CartResponse> {
        check_line_limit(req.quantity)?;
        let product = self.purchasable_product(req.product_id).await?;

        let existing = self.find_line(user_id, req.product_id).await?;
        let current = existing.as_ref().map_or(0, |l| l.quantity);
        let quantity = current
            .checked_add(req.quantity)
            .ok_or_else(line_limit_error)?;
        check_quantity(&product, quantity)?;

        let now = Utc::now();
        match existing {
            Some(line) => {
                let mut am = line.into_active_model();
                am.quantity = Set(quantity);
                am.updated_at = Set(Some(now));
                am.update(&self.pool).await?;
            }
            None => {
                let am = cart_items::ActiveModel {
                    user_id: Set(user_id),
                    product_id: Set(req.product_id),
                    quantity: Set(quantity),
                    created_at: Set(Some(now)),
                    updated_at: Set(Some(now)),
                    ..Default::default()
                };
                am.insert(&self.pool).await?;
            }
        }

        self.get_cart(user_id).await
    }

    pub async fn update_item(
        &self,
        user_id: i64,
        req: &UpdateCartRequest,
    ) -> AppResult<CartResponse> {
        let line = self
            .find_line(user_id, req.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item is not in the cart".to_string()))?;

        if req.quantity <= 0 {
            cart_items::Entity::delete_by_id(line.id)
                .exec(&self.pool)
                .await?;
            return self.get_cart(user_id).await;
        }

        let product = self.purchasable_product(req.product_id).await?;
        check_quantity(&product, req.quantity)?;

        let mut am = line.into_active_model();
        am.quantity = Set(req.quantity);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;

        self.get_cart(user_id).await
    }

    pub async fn remove_item(&self, user_id: i64, product_id: i64) -> AppResult<CartResponse> {
        let res = cart_items::Entity::delete_many()
            .filter(cart_items::Column::UserId.eq(user_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Item is not in the cart".to_string()));
        }
        self.get_cart(user_id).await
    }

    async fn find_line(&self, user_id: i64, product_id: i64) -> AppResult<Option<cart_items::Model>> {
        Ok(cart_items::Entity::find()
            .filter(cart_items::Column::UserId.eq(user_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .one(&self.pool)
            .await?)
    }

    async fn purchasable_product(&self, product_id: i64) -> AppResult<products::Model> {
        products::Entity::find_by_id(product_id)
            .one(&self.pool)
            .await?
            .filter(products::Model::is_purchasable)
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }
}

fn line_limit_error() -> AppError {
    AppError::ValidationError(format!(
        "Quantity must be between 1 and {MAX_CART_LINE_QUANTITY}"
    ))
}

/// 单行数量必须在 1..=MAX_CART_LINE_QUANTITY
fn check_line_limit(quantity: i32) -> AppResult<()> {
    if !(1..=MAX_CART_LINE_QUANTITY).contains(&quantity) {
        return Err(line_limit_error());
    }
    Ok(())
}

fn check_quantity(product: &products::Model, quantity: i32) -> AppResult<()> {
    check_line_limit(quantity)?;
    if quantity > product.stock {
        return Err(AppError::InsufficientStock {
            product: product.name.clone(),
        });
    }
    Ok(())
}
