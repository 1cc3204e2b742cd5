use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 收货地址。is_snapshot = true 的行是下单时复制出来的快照，不出现在地址簿中
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub label: Option<String>,
    pub recipient_name: String,
    pub phone: String,
    pub street_address: String,
    pub district: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub additional_info: Option<String>,
    pub is_snapshot: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
