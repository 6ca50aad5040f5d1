use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::upgrades::{DecideUpgradeRequest, UpgradeRequestList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::UpgradeRequest,
    response::ApiResponse,
    routes::params::UpgradeListQuery,
    services::upgrade_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upgrade-requests", get(list_upgrade_requests))
        .route("/upgrade-requests/{id}/decision", post(decide_upgrade))
}

#[utoipa::path(
    get,
    path = "/api/admin/upgrade-requests",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status: pending, approved, rejected")
    ),
    responses(
        (status = 200, description = "Tier upgrade requests (admin only)", body = ApiResponse<UpgradeRequestList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_upgrade_requests(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UpgradeListQuery>,
) -> AppResult<Json<ApiResponse<UpgradeRequestList>>> {
    let resp = upgrade_service::list_upgrade_requests(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/upgrade-requests/{id}/decision",
    params(("id" = Uuid, Path, description = "Upgrade request ID")),
    request_body = DecideUpgradeRequest,
    responses(
        (status = 200, description = "Request approved or rejected", body = ApiResponse<UpgradeRequest>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Request was already processed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn decide_upgrade(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecideUpgradeRequest>,
) -> AppResult<Json<ApiResponse<UpgradeRequest>>> {
    let resp = upgrade_service::decide_upgrade(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
