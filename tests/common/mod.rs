#![allow(dead_code)]

use std::sync::Arc;

use marketplace_core::{
    clock::FixedClock,
    db::{create_orm_conn, run_migrations},
    entity::{
        cart_items::ActiveModel as CartActive,
        products::{ActiveModel as ProductActive, Model as ProductModel},
        stores::{ActiveModel as StoreActive, Model as StoreModel, SubscriptionTier},
    },
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_STORE_OWNER},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tokio::sync::OnceCell;
use uuid::Uuid;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Build an app state against the test database, or `None` when no database is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    MIGRATED
        .get_or_try_init(|| async { run_migrations(&orm).await })
        .await?;

    // Noon: stores with hours set in these tests are open unless stated otherwise.
    let clock = FixedClock::at(12, 0).ok_or_else(|| anyhow::anyhow!("invalid clock"))?;
    Ok(Some(AppState::new(orm, "test-secret", Arc::new(clock))))
}

pub fn shopper() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    }
}

pub fn owner() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: ROLE_STORE_OWNER.into(),
    }
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: ROLE_ADMIN.into(),
    }
}

pub async fn create_store(
    state: &AppState,
    owner_id: Uuid,
    is_open: bool,
) -> anyhow::Result<StoreModel> {
    let store = StoreActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        name: Set(format!("store-{}", Uuid::new_v4().simple())),
        is_open: Set(is_open),
        opening_time: Set(None),
        closing_time: Set(None),
        order_count: Set(0),
        subscription_tier: Set(SubscriptionTier::Basic),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(store)
}

pub async fn create_product(
    state: &AppState,
    store_id: Uuid,
    price: Decimal,
) -> anyhow::Result<ProductModel> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        name: Set(format!("product-{}", Uuid::new_v4().simple())),
        price: Set(price),
        is_out_of_stock: Set(false),
        sales_count: Set(0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

/// Install a trigger that raises whenever `condition` holds for a row written to `table`.
/// Returns the names needed by [`drop_failure_trigger`].
pub async fn install_failure_trigger(
    state: &AppState,
    table: &str,
    event: &str,
    condition: &str,
) -> anyhow::Result<(String, String)> {
    let name = format!("fail_{}", Uuid::new_v4().simple());
    state
        .orm
        .execute_unprepared(&format!(
            "CREATE OR REPLACE FUNCTION {name}() RETURNS trigger AS $$ \
             BEGIN IF {condition} THEN RAISE EXCEPTION 'injected failure'; END IF; RETURN NEW; END; \
             $$ LANGUAGE plpgsql"
        ))
        .await?;
    state
        .orm
        .execute_unprepared(&format!(
            "CREATE TRIGGER {name} BEFORE {event} ON {table} FOR EACH ROW EXECUTE FUNCTION {name}()"
        ))
        .await?;
    Ok((name, table.to_string()))
}

pub async fn drop_failure_trigger(state: &AppState, trigger: (String, String)) -> anyhow::Result<()> {
    let (name, table) = trigger;
    state
        .orm
        .execute_unprepared(&format!("DROP TRIGGER IF EXISTS {name} ON {table}"))
        .await?;
    state
        .orm
        .execute_unprepared(&format!("DROP FUNCTION IF EXISTS {name}()"))
        .await?;
    Ok(())
}
