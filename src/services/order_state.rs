//! 订单状态机：唯一的一张迁移表，所有入口（用户取消、申请退款、上传凭证，
//! 管理员核验、改状态、发货、退款审核）都经由这里判断合法性。

use crate::entities::OrderStatus;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Customer,
    Admin,
}

/// 谁可以走这条边
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Actor {
    Customer,
    Admin,
    Either,
}

impl Actor {
    fn permits(self, role: ActorRole) -> bool {
        match self {
            Actor::Either => true,
            Actor::Customer => role == ActorRole::Customer,
            Actor::Admin => role == ActorRole::Admin,
        }
    }
}

use OrderStatus::*;

const TRANSITIONS: &[(OrderStatus, OrderStatus, Actor)] = &[
    (PendingPayment, PaymentUploaded, Actor::Customer),
    (PendingPayment, Cancelled, Actor::Either),
    (PaymentUploaded, PaymentVerified, Actor::Admin),
    (PaymentUploaded, Cancelled, Actor::Either),
    (PaymentVerified, Processing, Actor::Admin),
    (PaymentVerified, Cancelled, Actor::Admin),
    (PaymentVerified, RefundRequested, Actor::Customer),
    (Processing, Shipped, Actor::Admin),
    (Processing, Cancelled, Actor::Admin),
    (Processing, RefundRequested, Actor::Customer),
    (Shipped, Delivered, Actor::Admin),
    (Shipped, RefundRequested, Actor::Customer),
    (Delivered, RefundRequested, Actor::Customer),
    // 退款审核：通过进入 refunded，驳回回到申请前的状态
    (RefundRequested, Refunded, Actor::Admin),
    (RefundRequested, PaymentVerified, Actor::Admin),
    (RefundRequested, Processing, Actor::Admin),
    (RefundRequested, Shipped, Actor::Admin),
    (RefundRequested, Delivered, Actor::Admin),
];

/// from -> to 是否是表中的一条边（不考虑角色）
pub fn is_edge(from: OrderStatus, to: OrderStatus) -> bool {
    TRANSITIONS.iter().any(|(f, t, _)| *f == from && *t == to)
}

pub fn can_transition(from: OrderStatus, to: OrderStatus, role: ActorRole) -> bool {
    TRANSITIONS
        .iter()
        .any(|(f, t, actor)| *f == from && *t == to && actor.permits(role))
}

/// 某状态下该角色可以去往的状态
pub fn allowed_targets(from: OrderStatus, role: ActorRole) -> Vec<OrderStatus> {
    TRANSITIONS
        .iter()
        .filter(|(f, _, actor)| *f == from && actor.permits(role))
        .map(|(_, t, _)| *t)
        .collect()
}

pub fn ensure_transition(from: OrderStatus, to: OrderStatus, role: ActorRole) -> AppResult<()> {
    if can_transition(from, to, role) {
        Ok(())
    } else {
        Err(AppError::IllegalTransition { from, to })
    }
}
