use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::stores::SubscriptionTier, models::UpgradeRequest};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitUpgradeRequest {
    pub requested_tier: SubscriptionTier,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DecideUpgradeRequest {
    pub decision: UpgradeDecision,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpgradeRequestList {
    pub items: Vec<UpgradeRequest>,
}
