pub mod addresses;
pub mod cart_items;
pub mod order_items;
pub mod order_sequences;
pub mod order_status_history;
pub mod orders;
pub mod payment_details;
pub mod products;
pub mod refund_requests;
pub mod shipping_details;

pub use addresses as address_entity;
pub use cart_items as cart_item_entity;
pub use order_items as order_item_entity;
pub use order_sequences as order_sequence_entity;
pub use order_status_history as order_status_history_entity;
pub use orders as order_entity;
pub use orders::{OrderStatus, PaymentMethod};
pub use payment_details as payment_detail_entity;
pub use products as product_entity;
pub use refund_requests as refund_request_entity;
pub use refund_requests::RefundStatus;
pub use shipping_details as shipping_detail_entity;
