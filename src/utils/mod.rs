pub mod jwt;
pub mod order_number;
pub mod phone;

pub use jwt::*;
pub use order_number::*;
pub use phone::*;
