pub mod availability;
pub mod cart_aggregator;
pub mod counters;
pub mod order_service;
pub mod order_splitter;
pub mod rating_service;
pub mod store_service;
pub mod upgrade_service;
