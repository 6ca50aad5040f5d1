use chrono::NaiveTime;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAvailabilityRequest {
    pub is_open: bool,
    /// Leave either time empty to run the store on the manual switch alone.
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
}
