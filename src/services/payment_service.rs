use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};

use crate::config::UploadConfig;
use crate::entities::{OrderStatus, order_entity as orders, payment_detail_entity as payments};
use crate::error::{AppError, AppResult};
use crate::models::PaymentUploadResponse;
use crate::services::order_service::find_order;
use crate::services::order_state::ActorRole;
use crate::services::order_transition::apply_transition;
use crate::storage::{ProofStore, StoredProof, compress_proof, sniff_format};

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
    store: ProofStore,
    max_bytes: usize,
    max_dimension: u32,
}

impl PaymentService {
    pub fn new(pool: DatabaseConnection, config: &UploadConfig) -> Self {
        Self {
            pool,
            store: ProofStore::from_config(config),
            max_bytes: config.max_bytes,
            max_dimension: config.max_dimension,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// 读取上传内容之前的归属和状态检查
    pub async fn ensure_can_upload(&self, user_id: i64, order_id: i64) -> AppResult<()> {
        let order = find_order(&self.pool, order_id).await?;
        ensure_uploadable(&order, user_id)
    }

    /// 上传付款凭证
    ///
    /// 校验（归属、状态、大小、格式）全部在写文件之前完成；文件先落到暂存目录再
    /// rename 到最终位置，随后在一个事务内写支付记录并迁移状态。数据库失败时删掉
    /// 新文件，提交成功后才删除旧凭证。
    pub async fn upload_payment_proof(
        &self,
        user_id: i64,
        order_id: i64,
        bytes: Vec<u8>,
    ) -> AppResult<PaymentUploadResponse> {
        // 先确认订单归属和状态，再看文件
        self.ensure_can_upload(user_id, order_id).await?;

        if bytes.is_empty() {
            return Err(AppError::ValidationError(
                "Payment proof file is required".to_string(),
            ));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::ValidationError(format!(
                "File size exceeds the {}MB limit",
                self.max_bytes / (1024 * 1024)
            )));
        }
        let format = sniff_format(&bytes)?;

        let max_dimension = self.max_dimension;
        let compressed =
            tokio::task::spawn_blocking(move || compress_proof(&bytes, format, max_dimension))
                .await
                .map_err(|e| AppError::InternalError(format!("Image task failed: {e}")))??;

        let stored = self.store.store(order_id, &compressed, format).await?;

        match self.record_upload(user_id, order_id, &stored).await {
            Ok((response, previous_url)) => {
                if let Some(prev) = previous_url
                    && prev != stored.url
                {
                    self.store.remove_by_url(&prev).await;
                }
                Ok(response)
            }
            Err(e) => {
                self.store.remove(&stored).await;
                Err(e)
            }
        }
    }

    /// 返回响应和被替换掉的旧凭证 URL
    async fn record_upload(
        &self,
        user_id: i64,
        order_id: i64,
        stored: &StoredProof,
    ) -> AppResult<(PaymentUploadResponse, Option<String>)> {
        let txn = self.pool.begin().await?;

        // 处理图片期间订单可能已变化，事务内重新读取
        let order = find_order(&txn, order_id).await?;
        ensure_uploadable(&order, user_id)?;

        let now = Utc::now();
        let status = match order.status {
            OrderStatus::PendingPayment => {
                apply_transition(
                    &txn,
                    &order,
                    OrderStatus::PaymentUploaded,
                    ActorRole::Customer,
                    user_id,
                    Some("Payment proof uploaded".to_string()),
                    None,
                )
                .await?
                .status
            }
            _ => {
                // 重新上传：状态不变，只在状态仍为 payment_uploaded 时更新
                let res = orders::Entity::update_many()
                    .col_expr(orders::Column::UpdatedAt, Expr::value(now))
                    .filter(orders::Column::Id.eq(order.id))
                    .filter(orders::Column::Status.eq(OrderStatus::PaymentUploaded))
                    .exec(&txn)
                    .await?;
                if res.rows_affected == 0 {
                    return Err(AppError::InvalidState(
                        "Order status was changed by another request".to_string(),
                    ));
                }
                order.status
            }
        };

        let existing = payments::Entity::find()
            .filter(payments::Column::OrderId.eq(order.id))
            .one(&txn)
            .await?;

        let previous_url = match existing {
            Some(row) => {
                let previous = row.transfer_proof_url.clone();
                let mut am = row.into_active_model();
                am.payment_method = Set(order.payment_method);
                am.transfer_proof_url = Set(Some(stored.url.clone()));
                am.payment_amount = Set(order.total_amount);
                am.payment_date = Set(Some(now));
                am.updated_at = Set(Some(now));
                am.update(&txn).await?;
                previous
            }
            None => {
                payments::ActiveModel {
                    order_id: Set(order.id),
                    payment_method: Set(order.payment_method),
                    transfer_proof_url: Set(Some(stored.url.clone())),
                    payment_amount: Set(order.total_amount),
                    payment_date: Set(Some(now)),
                    created_at: Set(Some(now)),
                    updated_at: Set(Some(now)),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                None
            }
        };

        txn.commit().await?;

        log::info!(
            "Payment proof uploaded for order {} by user {user_id}",
            order.order_number
        );

        Ok((
            PaymentUploadResponse {
                order_id: order.id,
                status,
                transfer_proof_url: stored.url.clone(),
                payment_date: now,
            },
            previous_url,
        ))
    }
}

/// 只有下单人可以上传，且只能在核验之前
fn ensure_uploadable(order: &orders::Model, user_id: i64) -> AppResult<()> {
    if order.user_id != user_id {
        return Err(AppError::Forbidden(
            "You are not allowed to upload payment for this order".to_string(),
        ));
    }
    if !matches!(
        order.status,
        OrderStatus::PendingPayment | OrderStatus::PaymentUploaded
    ) {
        return Err(AppError::InvalidState(format!(
            "Payment proof cannot be uploaded while the order is {}",
            order.status
        )));
    }
    Ok(())
}
