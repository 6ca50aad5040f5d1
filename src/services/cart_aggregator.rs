use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, RelationTrait, Select,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    dto::cart::CartLineWithPrice,
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems, Relation as CartRel},
        products::Column as ProdCol,
    },
    error::{AppError, AppResult},
};

/// Cart lines partitioned by owning store, lines kept in cart insertion order.
pub type GroupedCart = BTreeMap<Uuid, Vec<CartLineWithPrice>>;

#[derive(Debug, FromQueryResult)]
struct CartProductRow {
    cart_item_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
    store_id: Uuid,
}

/// Cart lines of `user_id` joined to their products, oldest first.
///
/// Only the `cart_items` rows are locked `FOR UPDATE`; product rows stay readable by
/// concurrent checkouts of the same products.
pub fn cart_with_prices(user_id: Uuid) -> Select<CartItems> {
    let mut select = CartItems::find()
        .select_only()
        .column_as(CartCol::Id, "cart_item_id")
        .column_as(CartCol::ProductId, "product_id")
        .column_as(CartCol::Quantity, "quantity")
        .column_as(ProdCol::Price, "price")
        .column_as(ProdCol::StoreId, "store_id")
        .join(JoinType::InnerJoin, CartRel::Products.def())
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .order_by_asc(CartCol::Id);
    QueryTrait::query(&mut select).lock_with_tables(LockType::Update, [CartItems]);
    select
}

/// Load the shopper's cart with live prices and group it by store.
///
/// Callers should pass the checkout transaction so the row locks hold until commit.
pub async fn load_grouped_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<GroupedCart> {
    let rows = cart_with_prices(user_id)
        .into_model::<CartProductRow>()
        .all(conn)
        .await?;

    let lines = rows
        .into_iter()
        .map(|row| CartLineWithPrice {
            cart_item_id: row.cart_item_id,
            product_id: row.product_id,
            store_id: row.store_id,
            quantity: row.quantity,
            price: row.price,
        })
        .collect();

    group_by_store(lines)
}

/// Partition lines by `store_id`, rejecting empty carts and non-positive quantities.
pub fn group_by_store(lines: Vec<CartLineWithPrice>) -> AppResult<GroupedCart> {
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let mut grouped = GroupedCart::new();
    for line in lines {
        if line.quantity < 1 {
            return Err(AppError::Validation(format!(
                "cart line for product {} has invalid quantity {}",
                line.product_id, line.quantity
            )));
        }
        grouped.entry(line.store_id).or_default().push(line);
    }
    Ok(grouped)
}
