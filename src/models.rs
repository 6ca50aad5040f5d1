use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    order_items::Model as OrderItemModel,
    orders::{DeliveryOption, Model as OrderModel, OrderStatus, PaymentMethod},
    stores::SubscriptionTier,
    upgrade_requests::{Model as UpgradeRequestModel, UpgradeStatus},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub total_amount: Decimal,
    pub delivery_option: DeliveryOption,
    pub payment_method: PaymentMethod,
    pub phone_number: String,
    pub order_notes: Option<String>,
    pub location: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderModel> for Order {
    fn from(model: OrderModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            store_id: model.store_id,
            total_amount: model.total_amount,
            delivery_option: model.delivery_option,
            payment_method: model.payment_method,
            phone_number: model.phone_number,
            order_notes: model.order_notes,
            location: model.location,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            price_at_purchase: model.price_at_purchase,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpgradeRequest {
    pub id: Uuid,
    pub store_id: Uuid,
    pub current_tier: SubscriptionTier,
    pub requested_tier: SubscriptionTier,
    pub message: String,
    pub status: UpgradeStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl From<UpgradeRequestModel> for UpgradeRequest {
    fn from(model: UpgradeRequestModel) -> Self {
        Self {
            id: model.id,
            store_id: model.store_id,
            current_tier: model.current_tier,
            requested_tier: model.requested_tier,
            message: model.message,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            decided_at: model.decided_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreAvailability {
    pub store_id: Uuid,
    pub is_open: bool,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    /// Manual switch combined with the schedule, evaluated at request time.
    pub accepting_orders: bool,
}
