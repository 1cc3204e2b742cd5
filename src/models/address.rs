use crate::entities::address_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AddressInput {
    pub label: Option<String>,
    pub recipient_name: String,
    pub phone: String,
    pub street_address: String,
    pub district: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub additional_info: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: i64,
    pub label: Option<String>,
    pub recipient_name: String,
    pub phone: String,
    pub street_address: String,
    pub district: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub additional_info: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<address_entity::Model> for AddressResponse {
    fn from(m: address_entity::Model) -> Self {
        Self {
            id: m.id,
            label: m.label,
            recipient_name: m.recipient_name,
            phone: m.phone,
            street_address: m.street_address,
            district: m.district,
            city: m.city,
            province: m.province,
            postal_code: m.postal_code,
            additional_info: m.additional_info,
            created_at: m.created_at,
        }
    }
}
