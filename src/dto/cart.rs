use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// A cart line joined with the live price and owning store of its product.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartLineWithPrice {
    pub cart_item_id: Uuid,
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}
