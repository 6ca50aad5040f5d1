pub mod cart;
pub mod orders;
pub mod ratings;
pub mod stores;
pub mod upgrades;
