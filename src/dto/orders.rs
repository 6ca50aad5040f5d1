use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::orders::{DeliveryOption, PaymentMethod},
    models::{Order, OrderItem},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub delivery_option: DeliveryOption,
    pub phone_number: String,
    pub order_notes: Option<String>,
    /// Required when `delivery_option` is `delivery`.
    pub location: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutReceipt {
    pub order_ids: Vec<Uuid>,
    pub grand_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
