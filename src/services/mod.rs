pub mod auth_service;
pub mod cart_service;
pub mod images;
pub mod notification_service;
pub mod order_service;
pub mod product_service;
pub mod user_service;
