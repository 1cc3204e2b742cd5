pub mod address_service;
pub mod admin_order_service;
pub mod cart_service;
pub mod order_service;
pub mod order_state;
pub mod order_transition;
pub mod payment_service;
pub mod product_service;

pub use address_service::AddressService;
pub use admin_order_service::AdminOrderService;
pub use cart_service::CartService;
pub use order_service::OrderService;
pub use order_state::ActorRole;
pub use payment_service::PaymentService;
pub use product_service::ProductService;
