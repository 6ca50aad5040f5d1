mod common;

use common::{admin, create_store, drop_failure_trigger, install_failure_trigger, owner, setup_state};
use marketplace_core::{
    dto::upgrades::{DecideUpgradeRequest, SubmitUpgradeRequest, UpgradeDecision},
    entity::{
        stores::{Entity as Stores, SubscriptionTier},
        upgrade_requests::{Entity as UpgradeRequests, UpgradeStatus},
    },
    error::AppError,
    routes::params::UpgradeListQuery,
    services::upgrade_service,
    state::AppState,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

fn request(tier: SubscriptionTier) -> SubmitUpgradeRequest {
    SubmitUpgradeRequest {
        requested_tier: tier,
        message: "we outgrew basic".into(),
    }
}

fn decide(decision: UpgradeDecision) -> DecideUpgradeRequest {
    DecideUpgradeRequest { decision }
}

async fn tier_of(state: &AppState, store_id: Uuid) -> anyhow::Result<SubscriptionTier> {
    let store = Stores::find_by_id(store_id)
        .one(&state.orm)
        .await?
        .expect("store");
    Ok(store.subscription_tier)
}

#[tokio::test]
async fn approval_changes_tier_and_settles_request() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = owner();
    let admin = admin();
    let store = create_store(&state, owner.user_id, true).await?;

    let submitted = upgrade_service::submit_upgrade_request(
        &state,
        &owner,
        store.id,
        request(SubscriptionTier::Pro),
    )
    .await?
    .data
    .expect("request");
    assert_eq!(submitted.status, UpgradeStatus::Pending);
    assert_eq!(submitted.current_tier, SubscriptionTier::Basic);

    let listed = upgrade_service::list_upgrade_requests(
        &state,
        &admin,
        UpgradeListQuery {
            page: Some(1),
            per_page: Some(100),
            status: Some(UpgradeStatus::Pending),
        },
    )
    .await?
    .data
    .expect("list");
    assert!(listed.items.iter().any(|item| item.id == submitted.id));

    let decided = upgrade_service::decide_upgrade(
        &state,
        &admin,
        submitted.id,
        decide(UpgradeDecision::Approved),
    )
    .await?
    .data
    .expect("request");
    assert_eq!(decided.status, UpgradeStatus::Approved);
    assert!(decided.decided_at.is_some());
    assert_eq!(tier_of(&state, store.id).await?, SubscriptionTier::Pro);

    let again = upgrade_service::decide_upgrade(
        &state,
        &admin,
        submitted.id,
        decide(UpgradeDecision::Rejected),
    )
    .await;
    assert!(matches!(again, Err(AppError::AlreadyProcessed)));
    assert_eq!(tier_of(&state, store.id).await?, SubscriptionTier::Pro);

    Ok(())
}

#[tokio::test]
async fn rejection_leaves_tier_untouched() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = owner();
    let store = create_store(&state, owner.user_id, true).await?;

    let submitted = upgrade_service::submit_upgrade_request(
        &state,
        &owner,
        store.id,
        request(SubscriptionTier::Premium),
    )
    .await?
    .data
    .expect("request");

    let decided = upgrade_service::decide_upgrade(
        &state,
        &admin(),
        submitted.id,
        decide(UpgradeDecision::Rejected),
    )
    .await?
    .data
    .expect("request");
    assert_eq!(decided.status, UpgradeStatus::Rejected);
    assert_eq!(tier_of(&state, store.id).await?, SubscriptionTier::Basic);

    // A settled request no longer blocks a new one.
    upgrade_service::submit_upgrade_request(&state, &owner, store.id, request(SubscriptionTier::Pro))
        .await?;

    Ok(())
}

#[tokio::test]
async fn only_one_pending_request_per_store() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = owner();
    let store = create_store(&state, owner.user_id, true).await?;

    upgrade_service::submit_upgrade_request(&state, &owner, store.id, request(SubscriptionTier::Pro))
        .await?;
    let duplicate = upgrade_service::submit_upgrade_request(
        &state,
        &owner,
        store.id,
        request(SubscriptionTier::Premium),
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let same_tier = upgrade_service::submit_upgrade_request(
        &state,
        &owner,
        store.id,
        request(SubscriptionTier::Basic),
    )
    .await;
    assert!(matches!(same_tier, Err(AppError::Validation(_))));

    Ok(())
}

#[tokio::test]
async fn callers_without_rights_are_refused() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = owner();
    let store = create_store(&state, owner.user_id, true).await?;

    let stranger = common::owner();
    let submit = upgrade_service::submit_upgrade_request(
        &state,
        &stranger,
        store.id,
        request(SubscriptionTier::Pro),
    )
    .await;
    assert!(matches!(submit, Err(AppError::Forbidden)));

    let submitted = upgrade_service::submit_upgrade_request(
        &state,
        &owner,
        store.id,
        request(SubscriptionTier::Pro),
    )
    .await?
    .data
    .expect("request");

    let decide_as_owner = upgrade_service::decide_upgrade(
        &state,
        &owner,
        submitted.id,
        decide(UpgradeDecision::Approved),
    )
    .await;
    assert!(matches!(decide_as_owner, Err(AppError::Forbidden)));
    assert_eq!(tier_of(&state, store.id).await?, SubscriptionTier::Basic);

    let missing = upgrade_service::decide_upgrade(
        &state,
        &admin(),
        Uuid::new_v4(),
        decide(UpgradeDecision::Approved),
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn failed_tier_write_keeps_request_pending() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = owner();
    let admin = admin();
    let store = create_store(&state, owner.user_id, true).await?;

    let submitted = upgrade_service::submit_upgrade_request(
        &state,
        &owner,
        store.id,
        request(SubscriptionTier::Pro),
    )
    .await?
    .data
    .expect("request");

    let trigger = install_failure_trigger(
        &state,
        "stores",
        "UPDATE",
        &format!("NEW.id = '{}'", store.id),
    )
    .await?;
    let result = upgrade_service::decide_upgrade(
        &state,
        &admin,
        submitted.id,
        decide(UpgradeDecision::Approved),
    )
    .await;
    drop_failure_trigger(&state, trigger).await?;

    assert!(matches!(result, Err(AppError::Persistence(_))));
    let stored = UpgradeRequests::find_by_id(submitted.id)
        .one(&state.orm)
        .await?
        .expect("request");
    assert_eq!(stored.status, UpgradeStatus::Pending);
    assert!(stored.decided_at.is_none());
    assert_eq!(tier_of(&state, store.id).await?, SubscriptionTier::Basic);

    // The request can still be decided once the fault is gone.
    upgrade_service::decide_upgrade(&state, &admin, submitted.id, decide(UpgradeDecision::Approved))
        .await?;
    assert_eq!(tier_of(&state, store.id).await?, SubscriptionTier::Pro);

    Ok(())
}
