use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    entity::{
        products::{Column as ProdCol, Entity as Products},
        stores::{Column as StoreCol, Entity as Stores},
    },
    error::{AppError, AppResult},
};

// Both counters are single `UPDATE ... SET c = c + n` statements. They must run on the
// checkout transaction so they commit or roll back with the orders that justify them.

pub async fn increment_store_orders<C: ConnectionTrait>(conn: &C, store_id: Uuid) -> AppResult<()> {
    let result = Stores::update_many()
        .col_expr(StoreCol::OrderCount, Expr::col(StoreCol::OrderCount).add(1))
        .filter(StoreCol::Id.eq(store_id))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn increment_product_sales<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<()> {
    let result = Products::update_many()
        .col_expr(ProdCol::SalesCount, Expr::col(ProdCol::SalesCount).add(quantity))
        .filter(ProdCol::Id.eq(product_id))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
