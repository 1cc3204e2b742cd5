use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use super::orders::OrderStatus;

/// 只追加的状态流水
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "order_status_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub changed_by: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
