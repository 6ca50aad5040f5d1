use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RateStoreRequest {
    pub score: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RatingStats {
    /// Number of ratings per score, always keyed 1 through 5.
    pub counts: BTreeMap<i16, i64>,
    pub total: i64,
    pub average: Decimal,
}
