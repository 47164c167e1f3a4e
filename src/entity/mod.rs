pub mod audit_logs;
pub mod cart_items;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use notifications::Entity as Notifications;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use users::Entity as Users;
