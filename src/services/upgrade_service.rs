use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit,
    dto::upgrades::{DecideUpgradeRequest, SubmitUpgradeRequest, UpgradeDecision, UpgradeRequestList},
    entity::{
        stores::{ActiveModel as StoreActive, Column as StoreCol, Entity as Stores},
        upgrade_requests::{
            ActiveModel as UpgradeActive, Column as UpgradeCol, Entity as UpgradeRequests,
            UpgradeStatus,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::UpgradeRequest,
    response::{ApiResponse, Meta},
    routes::params::UpgradeListQuery,
    services::store_service::find_managed_store,
    state::AppState,
};

const PENDING_EXISTS: &str = "store already has a pending upgrade request";

impl UpgradeDecision {
    pub fn status(self) -> UpgradeStatus {
        match self {
            UpgradeDecision::Approved => UpgradeStatus::Approved,
            UpgradeDecision::Rejected => UpgradeStatus::Rejected,
        }
    }
}

pub async fn submit_upgrade_request(
    state: &AppState,
    user: &AuthUser,
    store_id: Uuid,
    payload: SubmitUpgradeRequest,
) -> AppResult<ApiResponse<UpgradeRequest>> {
    let store = find_managed_store(&state.orm, user, store_id).await?;
    if store.subscription_tier == payload.requested_tier {
        return Err(AppError::Validation(
            "requested tier equals the current tier".into(),
        ));
    }

    let pending = UpgradeRequests::find()
        .filter(UpgradeCol::StoreId.eq(store_id))
        .filter(UpgradeCol::Status.eq(UpgradeStatus::Pending))
        .count(&state.orm)
        .await?;
    if pending > 0 {
        return Err(AppError::Conflict(PENDING_EXISTS.into()));
    }

    // The partial unique index catches submissions racing past the check above.
    let request = UpgradeActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        current_tier: Set(store.subscription_tier),
        requested_tier: Set(payload.requested_tier),
        message: Set(payload.message.trim().to_string()),
        status: Set(UpgradeStatus::Pending),
        created_at: Set(Utc::now().into()),
        decided_at: Set(None),
    }
    .insert(&state.orm)
    .await
    .map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(PENDING_EXISTS.into()),
        _ => AppError::Persistence(err),
    })?;

    audit::record(
        &state.orm,
        user.user_id,
        "upgrade_requested",
        "upgrade_requests",
        serde_json::json!({ "request_id": request.id, "store_id": store_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Upgrade requested",
        UpgradeRequest::from(request),
        Some(Meta::empty()),
    ))
}

pub async fn list_upgrade_requests(
    state: &AppState,
    user: &AuthUser,
    query: UpgradeListQuery,
) -> AppResult<ApiResponse<UpgradeRequestList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(UpgradeCol::Status.eq(status));
    }

    let finder = UpgradeRequests::find()
        .filter(condition)
        .order_by_desc(UpgradeCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(UpgradeRequest::from)
        .collect();

    Ok(ApiResponse::success(
        "Upgrade requests",
        UpgradeRequestList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Settle a pending request.
///
/// Approval writes the request status and the store tier in one transaction, so no
/// reader can see an approved request next to the old tier.
pub async fn decide_upgrade(
    state: &AppState,
    user: &AuthUser,
    request_id: Uuid,
    payload: DecideUpgradeRequest,
) -> AppResult<ApiResponse<UpgradeRequest>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let request = UpgradeRequests::find_by_id(request_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if request.status != UpgradeStatus::Pending {
        return Err(AppError::AlreadyProcessed);
    }

    let store_id = request.store_id;
    let requested_tier = request.requested_tier;

    let mut active: UpgradeActive = request.into();
    active.status = Set(payload.decision.status());
    active.decided_at = Set(Some(Utc::now().into()));
    let request = active.update(&txn).await?;

    if payload.decision == UpgradeDecision::Approved {
        let result = Stores::update_many()
            .set(StoreActive {
                subscription_tier: Set(requested_tier),
                ..Default::default()
            })
            .filter(StoreCol::Id.eq(store_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::Persistence(DbErr::RecordNotUpdated));
        }
    }

    txn.commit().await?;

    tracing::info!(
        request_id = %request.id,
        store_id = %store_id,
        status = ?request.status,
        "upgrade request decided"
    );

    audit::record(
        &state.orm,
        user.user_id,
        "upgrade_decided",
        "upgrade_requests",
        serde_json::json!({
            "request_id": request.id,
            "store_id": store_id,
            "decision": payload.decision,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Upgrade request decided",
        UpgradeRequest::from(request),
        Some(Meta::empty()),
    ))
}
