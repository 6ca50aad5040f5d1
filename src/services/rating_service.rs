use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set};
use sea_orm::sea_query::{Expr, OnConflict};
use uuid::Uuid;

use crate::{
    audit,
    dto::ratings::{RateStoreRequest, RatingStats},
    entity::{
        store_ratings::{ActiveModel as RatingActive, Column as RatingCol, Entity as StoreRatings},
        stores::Entity as Stores,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const MIN_SCORE: i16 = 1;
pub const MAX_SCORE: i16 = 5;

/// Build the histogram and the one-decimal average from `(score, count)` rows.
pub fn summarize(rows: &[(i16, i64)]) -> RatingStats {
    let mut counts: BTreeMap<i16, i64> =
        (MIN_SCORE..=MAX_SCORE).map(|score| (score, 0)).collect();
    for &(score, count) in rows {
        if let Some(slot) = counts.get_mut(&score) {
            *slot += count;
        }
    }

    let total: i64 = counts.values().sum();
    let weighted: i64 = counts
        .iter()
        .map(|(score, count)| i64::from(*score) * count)
        .sum();

    let average = if total == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(weighted) / Decimal::from(total))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    };

    RatingStats {
        counts,
        total,
        average,
    }
}

pub async fn compute_stats(state: &AppState, store_id: Uuid) -> AppResult<ApiResponse<RatingStats>> {
    Stores::find_by_id(store_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let rows: Vec<(i16, i64)> = StoreRatings::find()
        .select_only()
        .column(RatingCol::Score)
        .column_as(Expr::col(RatingCol::Id).count(), "count")
        .filter(RatingCol::StoreId.eq(store_id))
        .group_by(RatingCol::Score)
        .into_tuple()
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success("OK", summarize(&rows), Some(Meta::empty())))
}

/// Record the caller's score for a store, replacing any earlier one.
pub async fn rate_store(
    state: &AppState,
    user: &AuthUser,
    store_id: Uuid,
    payload: RateStoreRequest,
) -> AppResult<ApiResponse<RatingStats>> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&payload.score) {
        return Err(AppError::Validation(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}"
        )));
    }

    Stores::find_by_id(store_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let now = Utc::now();
    StoreRatings::insert(RatingActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        user_id: Set(user.user_id),
        score: Set(payload.score),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
    .on_conflict(
        OnConflict::columns([RatingCol::StoreId, RatingCol::UserId])
            .update_columns([RatingCol::Score, RatingCol::UpdatedAt])
            .to_owned(),
    )
    .exec_without_returning(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "store_rated",
        "store_ratings",
        serde_json::json!({ "store_id": store_id, "score": payload.score }),
    )
    .await;

    compute_stats(state, store_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_ratings_average_zero() {
        let stats = summarize(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average, Decimal::ZERO);
        assert_eq!(stats.counts.len(), 5);
        assert!(stats.counts.values().all(|count| *count == 0));
    }

    #[test]
    fn average_is_weighted_and_rounded_to_one_decimal() {
        // 2x2 + 1x3 = 7 over 3 ratings
        let stats = summarize(&[(2, 2), (3, 1)]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.counts[&2], 2);
        assert_eq!(stats.counts[&3], 1);
        assert_eq!(stats.average, Decimal::new(23, 1));
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        // (4 + 5 + 5 + 5) / 4 = 4.75
        let stats = summarize(&[(4, 1), (5, 3)]);
        assert_eq!(stats.average, Decimal::new(48, 1));
    }

    #[test]
    fn out_of_range_scores_are_ignored() {
        let stats = summarize(&[(0, 4), (5, 1), (9, 2)]);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.average, Decimal::new(5, 0));
    }
}
