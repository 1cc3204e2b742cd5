use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use super::orders::PaymentMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payment_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub order_id: i64,
    pub payment_method: PaymentMethod,
    pub transfer_proof_url: Option<String>,
    pub payment_amount: i64,
    pub payment_date: Option<DateTime<Utc>>,
    pub verified_by: Option<i64>,
    pub verified_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// verified_at 是否存在是“已核验”的唯一依据
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}
