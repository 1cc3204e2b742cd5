use crate::entities::product_entity as products;
use crate::error::{AppError, AppResult};
use crate::models::{PaginatedResponse, PaginationParams, ProductQuery, ProductResponse};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

#[derive(Clone)]
pub struct ProductService {
    pool: DatabaseConnection,
}

impl ProductService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    fn visible() -> Condition {
        Condition::all()
            .add(products::Column::IsActive.eq(true))
            .add(products::Column::DeletedAt.is_null())
    }

    /// 上架且未删除的商品列表
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> AppResult<PaginatedResponse<ProductResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = products::Entity::find().filter(Self::visible());
        if let Some(search) = query.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            base_query = base_query.filter(products::Column::Name.contains(search));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let items = base_query
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .limit(params.get_per_page())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }

    pub async fn get_product(&self, product_id: i64) -> AppResult<ProductResponse> {
        products::Entity::find_by_id(product_id)
            .filter(Self::visible())
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }
}
