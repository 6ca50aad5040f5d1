use chrono::NaiveTime;

use crate::entity::stores::Model as StoreModel;

/// The schedule-relevant part of a store row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHours {
    pub is_open: bool,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
}

impl From<&StoreModel> for StoreHours {
    fn from(store: &StoreModel) -> Self {
        Self {
            is_open: store.is_open,
            opening_time: store.opening_time,
            closing_time: store.closing_time,
        }
    }
}

/// Whether a store takes orders at local time `now`.
///
/// Without both an opening and a closing time the manual switch decides alone.
/// With a window, the store must be switched on *and* inside it; a window whose
/// opening is not before its closing wraps past midnight (22:00-06:00).
pub fn is_effectively_open(hours: StoreHours, now: NaiveTime) -> bool {
    let (Some(opening), Some(closing)) = (hours.opening_time, hours.closing_time) else {
        return hours.is_open;
    };

    let open_by_time = if opening < closing {
        opening <= now && now < closing
    } else {
        now >= opening || now < closing
    };

    hours.is_open && open_by_time
}
