use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::{OrderList, OrderWithItems},
        ratings::{RateStoreRequest, RatingStats},
        stores::UpdateAvailabilityRequest,
        upgrades::SubmitUpgradeRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{StoreAvailability, UpgradeRequest},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{rating_service, store_service, upgrade_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/availability",
            get(get_availability).patch(update_availability),
        )
        .route("/{id}/orders", get(list_store_orders))
        .route("/{id}/orders/{order_id}", delete(delete_order))
        .route("/{id}/orders/{order_id}/finish", patch(finish_order))
        .route("/{id}/ratings", get(get_rating_stats).put(rate_store))
        .route("/{id}/upgrade-requests", post(submit_upgrade_request))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}/availability",
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Manual switch, schedule and whether orders are accepted right now", body = ApiResponse<StoreAvailability>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Stores"
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StoreAvailability>>> {
    let resp = store_service::get_availability(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/stores/{id}/availability",
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = UpdateAvailabilityRequest,
    responses(
        (status = 200, description = "Availability updated", body = ApiResponse<StoreAvailability>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn update_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<StoreAvailability>>> {
    let resp = store_service::update_availability(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}/orders",
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status: pending, finished"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Orders received by the store", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn list_store_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = store_service::list_store_orders(&state, &user, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/stores/{id}/orders/{order_id}/finish",
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order marked finished", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order already finished"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn finish_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, order_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = store_service::finish_order(&state, &user, id, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/stores/{id}/orders/{order_id}",
    params(
        ("id" = Uuid, Path, description = "Store ID"),
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, order_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = store_service::delete_order(&state, &user, id, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}/ratings",
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Rating histogram and average", body = ApiResponse<RatingStats>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Stores"
)]
pub async fn get_rating_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RatingStats>>> {
    let resp = rating_service::compute_stats(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/stores/{id}/ratings",
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = RateStoreRequest,
    responses(
        (status = 200, description = "Score recorded, updated stats returned", body = ApiResponse<RatingStats>),
        (status = 400, description = "Score outside 1..5"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn rate_store(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateStoreRequest>,
) -> AppResult<Json<ApiResponse<RatingStats>>> {
    let resp = rating_service::rate_store(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/stores/{id}/upgrade-requests",
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = SubmitUpgradeRequest,
    responses(
        (status = 200, description = "Upgrade request submitted", body = ApiResponse<UpgradeRequest>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "A pending request already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn submit_upgrade_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitUpgradeRequest>,
) -> AppResult<Json<ApiResponse<UpgradeRequest>>> {
    let resp = upgrade_service::submit_upgrade_request(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
