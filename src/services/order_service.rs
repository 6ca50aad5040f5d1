use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutReceipt, CheckoutRequest, OrderList, OrderWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, OrderStatus},
        stores::{Column as StoreCol, Entity as Stores},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{
        availability::{StoreHours, is_effectively_open},
        cart_aggregator::{GroupedCart, load_grouped_cart},
        counters,
        order_splitter::{OrderDraft, grand_total, split_into_orders},
    },
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
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

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Turn the shopper's cart into one order per store.
///
/// Everything from reading the cart to clearing it runs in a single transaction:
/// if any store-order fails to persist, no order, no counter increment and no
/// cart deletion survives, so the shopper can simply retry.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutReceipt>> {
    let now = state.clock.local_time();
    let txn = state.orm.begin().await?;

    let cart = load_grouped_cart(&txn, user.user_id).await?;
    ensure_stores_accepting(&txn, &cart, now).await?;
    let drafts = split_into_orders(&cart, &payload)?;

    let mut order_ids = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        order_ids.push(persist_draft(&txn, user.user_id, &payload, draft).await?);
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    let grand_total = grand_total(&drafts);
    tracing::info!(
        user_id = %user.user_id,
        orders = order_ids.len(),
        grand_total = %grand_total,
        "checkout committed"
    );

    audit::record(
        &state.orm,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_ids": order_ids, "grand_total": grand_total }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutReceipt {
            order_ids,
            grand_total,
        },
        Some(Meta::empty()),
    ))
}

async fn ensure_stores_accepting<C: ConnectionTrait>(
    conn: &C,
    cart: &GroupedCart,
    now: chrono::NaiveTime,
) -> AppResult<()> {
    let stores = Stores::find()
        .filter(StoreCol::Id.is_in(cart.keys().copied()))
        .all(conn)
        .await?;

    for store_id in cart.keys() {
        let store = stores
            .iter()
            .find(|store| store.id == *store_id)
            .ok_or(AppError::NotFound)?;
        if !is_effectively_open(StoreHours::from(store), now) {
            tracing::info!(store_id = %store_id, %now, "checkout rejected, store closed");
            return Err(AppError::StoreClosed(*store_id));
        }
    }
    Ok(())
}

async fn persist_draft(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    payload: &CheckoutRequest,
    draft: &OrderDraft,
) -> AppResult<Uuid> {
    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        store_id: Set(draft.store_id),
        total_amount: Set(draft.total),
        delivery_option: Set(payload.delivery_option),
        payment_method: Set(payload.payment_method),
        phone_number: Set(payload.phone_number.trim().to_string()),
        order_notes: Set(non_blank(payload.order_notes.as_deref())),
        location: Set(non_blank(payload.location.as_deref())),
        status: Set(OrderStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await?;

    for item in &draft.items {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            price_at_purchase: Set(item.price_at_purchase),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await?;

        counters::increment_product_sales(txn, item.product_id, item.quantity).await?;
    }

    counters::increment_store_orders(txn, draft.store_id).await?;

    tracing::debug!(
        order_id = %order.id,
        store_id = %draft.store_id,
        total = %draft.total,
        "store order created"
    );
    Ok(order.id)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = load_items(&state.orm, order.id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn load_items<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(items)
}
