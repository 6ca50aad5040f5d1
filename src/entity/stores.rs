use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[sea_orm(string_value = "basic")]
    Basic,
    #[sea_orm(string_value = "pro")]
    Pro,
    #[sea_orm(string_value = "premium")]
    Premium,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub is_open: bool,
    pub opening_time: Option<Time>,
    pub closing_time: Option<Time>,
    pub order_count: i32,
    pub subscription_tier: SubscriptionTier,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(has_many = "super::upgrade_requests::Entity")]
    UpgradeRequests,
    #[sea_orm(has_many = "super::store_ratings::Entity")]
    StoreRatings,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::upgrade_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UpgradeRequests.def()
    }
}

impl Related<super::store_ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreRatings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
