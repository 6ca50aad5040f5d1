mod common;

use common::{create_store, setup_state, shopper};
use marketplace_core::{dto::ratings::RateStoreRequest, error::AppError, services::rating_service};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn resubmitted_rating_replaces_previous_score() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let store = create_store(&state, Uuid::new_v4(), true).await?;
    let first = shopper();
    let second = shopper();

    rating_service::rate_store(&state, &first, store.id, RateStoreRequest { score: 2 }).await?;
    rating_service::rate_store(&state, &second, store.id, RateStoreRequest { score: 5 }).await?;
    let stats = rating_service::rate_store(&state, &first, store.id, RateStoreRequest { score: 4 })
        .await?
        .data
        .expect("stats");

    assert_eq!(stats.total, 2);
    assert_eq!(stats.counts[&2], 0);
    assert_eq!(stats.counts[&4], 1);
    assert_eq!(stats.counts[&5], 1);
    assert_eq!(stats.average, Decimal::new(45, 1));

    let fetched = rating_service::compute_stats(&state, store.id)
        .await?
        .data
        .expect("stats");
    assert_eq!(fetched, stats);

    Ok(())
}

#[tokio::test]
async fn invalid_ratings_are_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let store = create_store(&state, Uuid::new_v4(), true).await?;
    let user = shopper();

    let too_high =
        rating_service::rate_store(&state, &user, store.id, RateStoreRequest { score: 6 }).await;
    assert!(matches!(too_high, Err(AppError::Validation(_))));

    let unknown_store =
        rating_service::rate_store(&state, &user, Uuid::new_v4(), RateStoreRequest { score: 3 })
            .await;
    assert!(matches!(unknown_store, Err(AppError::NotFound)));

    let stats = rating_service::compute_stats(&state, store.id)
        .await?
        .data
        .expect("stats");
    assert_eq!(stats.total, 0);
    assert_eq!(stats.average, Decimal::ZERO);

    Ok(())
}
