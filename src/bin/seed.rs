use marketplace_core::{
    config::AppConfig,
    db::{DbPool, create_pool, orm_from_pool, run_migrations},
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    // Ensure migrations are applied.
    run_migrations(&orm_from_pool(pool.clone())).await?;

    let owner_id = Uuid::new_v4();
    let shopper_id = Uuid::new_v4();

    let bakery = ensure_store(&pool, owner_id, "Ferris Bakery", Some(("07:00", "19:00"))).await?;
    let night_shop = ensure_store(&pool, owner_id, "Night Owl Deli", Some(("22:00", "06:00"))).await?;
    let kiosk = ensure_store(&pool, owner_id, "Corner Kiosk", None).await?;

    let products = vec![
        (bakery, "Sourdough Loaf", Decimal::new(650, 2)),
        (bakery, "Croissant", Decimal::new(275, 2)),
        (night_shop, "Midnight Sandwich", Decimal::new(900, 2)),
        (kiosk, "Sparkling Water", Decimal::new(150, 2)),
    ];

    let mut product_ids = Vec::new();
    for (store_id, name, price) in products {
        product_ids.push(ensure_product(&pool, store_id, name, price).await?);
    }

    for (product_id, quantity) in product_ids.iter().zip([2, 4, 1, 3]) {
        sqlx::query(
            r#"
            INSERT INTO cart_items (id, user_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(shopper_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&pool)
        .await?;
    }

    println!("Seed completed. Store owner ID: {owner_id}, shopper ID: {shopper_id}");
    Ok(())
}

async fn ensure_store(
    pool: &DbPool,
    owner_id: Uuid,
    name: &str,
    hours: Option<(&str, &str)>,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM stores WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        println!("Store {name} already present");
        return Ok(id);
    }

    let (opening, closing) = match hours {
        Some((opening, closing)) => (
            Some(chrono::NaiveTime::parse_from_str(opening, "%H:%M")?),
            Some(chrono::NaiveTime::parse_from_str(closing, "%H:%M")?),
        ),
        None => (None, None),
    };

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO stores (id, owner_id, name, is_open, opening_time, closing_time)
        VALUES ($1, $2, $3, TRUE, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(name)
    .bind(opening)
    .bind(closing)
    .fetch_one(pool)
    .await?;

    println!("Seeded store {name}");
    Ok(id)
}

async fn ensure_product(
    pool: &DbPool,
    store_id: Uuid,
    name: &str,
    price: Decimal,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM products WHERE store_id = $1 AND name = $2")
            .bind(store_id)
            .bind(name)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO products (id, store_id, name, price) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(store_id)
    .bind(name)
    .bind(price)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
