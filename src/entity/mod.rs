pub mod audit_logs;
pub mod cart_items;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod store_ratings;
pub mod stores;
pub mod upgrade_requests;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use store_ratings::Entity as StoreRatings;
pub use stores::Entity as Stores;
pub use upgrade_requests::Entity as UpgradeRequests;
