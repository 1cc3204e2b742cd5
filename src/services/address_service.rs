use crate::entities::address_entity as addresses;
use crate::error::{AppError, AppResult};
use crate::models::{AddressInput, AddressResponse};
use crate::utils::validate_id_phone;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};

#[derive(Clone)]
pub struct AddressService {
    pool: DatabaseConnection,
}

impl AddressService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 地址簿，不含订单快照
    pub async fn list_addresses(&self, user_id: i64) -> AppResult<Vec<AddressResponse>> {
        let list = addresses::Entity::find()
            .filter(addresses::Column::UserId.eq(user_id))
            .filter(addresses::Column::IsSnapshot.eq(false))
            .order_by_desc(addresses::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create_address(
        &self,
        user_id: i64,
        input: &AddressInput,
    ) -> AppResult<AddressResponse> {
        let input = validate_address(input)?;
        let model = insert_address(&self.pool, user_id, &input, false).await?;
        Ok(model.into())
    }

    /// 只能修改自己的地址簿条目；已生成的订单快照不受影响
    pub async fn update_address(
        &self,
        user_id: i64,
        address_id: i64,
        input: &AddressInput,
    ) -> AppResult<AddressResponse> {
        let input = validate_address(input)?;
        let saved = addresses::Entity::find_by_id(address_id)
            .filter(addresses::Column::UserId.eq(user_id))
            .filter(addresses::Column::IsSnapshot.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;

        let mut am = saved.into_active_model();
        am.label = Set(input.label);
        am.recipient_name = Set(input.recipient_name);
        am.phone = Set(input.phone);
        am.street_address = Set(input.street_address);
        am.district = Set(input.district);
        am.city = Set(input.city);
        am.province = Set(input.province);
        am.postal_code = Set(input.postal_code);
        am.additional_info = Set(input.additional_info);
        am.updated_at = Set(Some(Utc::now()));
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn delete_address(&self, user_id: i64, address_id: i64) -> AppResult<()> {
        let res = addresses::Entity::delete_many()
            .filter(addresses::Column::Id.eq(address_id))
            .filter(addresses::Column::UserId.eq(user_id))
            .filter(addresses::Column::IsSnapshot.eq(false))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Address not found".to_string()));
        }
        Ok(())
    }
}

/// 校验必填字段并规范化手机号
pub fn validate_address(input: &AddressInput) -> AppResult<AddressInput> {
    let required = [
        ("recipient_name", &input.recipient_name),
        ("phone", &input.phone),
        ("street_address", &input.street_address),
        ("district", &input.district),
        ("city", &input.city),
        ("province", &input.province),
        ("postal_code", &input.postal_code),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::ValidationError(format!("{field} is required")));
        }
    }

    let postal_code = input.postal_code.trim();
    if postal_code.len() != 5 || !postal_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::ValidationError(
            "postal_code must be 5 digits".to_string(),
        ));
    }

    let trimmed = |s: &Option<String>| {
        s.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    Ok(AddressInput {
        label: trimmed(&input.label),
        recipient_name: input.recipient_name.trim().to_string(),
        phone: validate_id_phone(&input.phone)?,
        street_address: input.street_address.trim().to_string(),
        district: input.district.trim().to_string(),
        city: input.city.trim().to_string(),
        province: input.province.trim().to_string(),
        postal_code: postal_code.to_string(),
        additional_info: trimmed(&input.additional_info),
    })
}

async fn insert_address<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    input: &AddressInput,
    is_snapshot: bool,
) -> AppResult<addresses::Model> {
    let now = Utc::now();
    let am = addresses::ActiveModel {
        user_id: Set(user_id),
        label: Set(input.label.clone()),
        recipient_name: Set(input.recipient_name.clone()),
        phone: Set(input.phone.clone()),
        street_address: Set(input.street_address.clone()),
        district: Set(input.district.clone()),
        city: Set(input.city.clone()),
        province: Set(input.province.clone()),
        postal_code: Set(input.postal_code.clone()),
        additional_info: Set(input.additional_info.clone()),
        is_snapshot: Set(is_snapshot),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    };
    Ok(am.insert(conn).await?)
}

/// 由请求中的地址字段生成订单地址快照
pub async fn snapshot_from_input<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    input: &AddressInput,
) -> AppResult<addresses::Model> {
    let input = validate_address(input)?;
    insert_address(conn, user_id, &input, true).await
}

/// 复制用户已保存的地址作为订单快照，之后修改或删除原地址不影响订单
pub async fn snapshot_from_saved<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    address_id: i64,
) -> AppResult<addresses::Model> {
    let saved = addresses::Entity::find_by_id(address_id)
        .filter(addresses::Column::UserId.eq(user_id))
        .filter(addresses::Column::IsSnapshot.eq(false))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;

    let input = AddressInput {
        label: saved.label,
        recipient_name: saved.recipient_name,
        phone: saved.phone,
        street_address: saved.street_address,
        district: saved.district,
        city: saved.city,
        province: saved.province,
        postal_code: saved.postal_code,
        additional_info: saved.additional_info,
    };
    insert_address(conn, user_id, &input, true).await
}
