use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        orders::{OrderList, OrderWithItems},
        stores::UpdateAvailabilityRequest,
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, OrderStatus},
        stores::{ActiveModel as StoreActive, Entity as Stores, Model as StoreModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, StoreAvailability},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{
        availability::{StoreHours, is_effectively_open},
        order_service::load_items,
    },
    state::AppState,
};

/// Load a store the caller owns; operators may act on any store.
pub async fn find_managed_store<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    store_id: Uuid,
) -> AppResult<StoreModel> {
    let store = Stores::find_by_id(store_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    if store.owner_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(store)
}

fn availability_of(store: &StoreModel, now: chrono::NaiveTime) -> StoreAvailability {
    StoreAvailability {
        store_id: store.id,
        is_open: store.is_open,
        opening_time: store.opening_time,
        closing_time: store.closing_time,
        accepting_orders: is_effectively_open(StoreHours::from(store), now),
    }
}

pub async fn get_availability(
    state: &AppState,
    store_id: Uuid,
) -> AppResult<ApiResponse<StoreAvailability>> {
    let store = Stores::find_by_id(store_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "OK",
        availability_of(&store, state.clock.local_time()),
        Some(Meta::empty()),
    ))
}

pub async fn update_availability(
    state: &AppState,
    user: &AuthUser,
    store_id: Uuid,
    payload: UpdateAvailabilityRequest,
) -> AppResult<ApiResponse<StoreAvailability>> {
    let store = find_managed_store(&state.orm, user, store_id).await?;

    let mut active: StoreActive = store.into();
    active.is_open = Set(payload.is_open);
    active.opening_time = Set(payload.opening_time);
    active.closing_time = Set(payload.closing_time);
    let store = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "store_availability_update",
        "stores",
        serde_json::json!({
            "store_id": store.id,
            "is_open": store.is_open,
            "opening_time": store.opening_time,
            "closing_time": store.closing_time,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Availability updated",
        availability_of(&store, state.clock.local_time()),
        Some(Meta::empty()),
    ))
}

pub async fn list_store_orders(
    state: &AppState,
    user: &AuthUser,
    store_id: Uuid,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    find_managed_store(&state.orm, user, store_id).await?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(OrderCol::StoreId.eq(store_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Move a store-order from `pending` to its terminal `finished` state.
pub async fn finish_order(
    state: &AppState,
    user: &AuthUser,
    store_id: Uuid,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;
    find_managed_store(&txn, user, store_id).await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(order_id))
                .add(OrderCol::StoreId.eq(store_id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.status != OrderStatus::Pending {
        return Err(AppError::AlreadyProcessed);
    }

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Finished);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    let items = load_items(&txn, order.id).await?;

    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "order_finished",
        "orders",
        serde_json::json!({ "order_id": order.id, "store_id": store_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order finished",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Remove a store-order and its items. Counters stay as they are.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    store_id: Uuid,
    order_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_managed_store(&state.orm, user, store_id).await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(order_id))
                .add(OrderCol::StoreId.eq(store_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    order.delete(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "order_deleted",
        "orders",
        serde_json::json!({ "order_id": order_id, "store_id": store_id }),
    )
    .await;

    Ok(ApiResponse::message_only("Order deleted"))
}
