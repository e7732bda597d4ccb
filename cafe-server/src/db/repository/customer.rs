//! Customer & Order Ledger Repository
//!
//! The ledger is append-only: orders are inserted and read, never updated
//! or deleted. The reward redemption is the single multi-statement write
//! and runs inside one transaction.

use super::{RepoError, RepoResult};
use shared::models::{Customer, DrinkCategory, Order};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT id, customer_id, drink_category, item_name, item_id, price, is_reward, created_at FROM customer_order";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let rows = sqlx::query_as::<_, Customer>(
        "SELECT id, name, phone, rewards_redeemed, created_at, updated_at FROM customer ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_phone(pool: &SqlitePool, phone: &str) -> RepoResult<Option<Customer>> {
    let row = sqlx::query_as::<_, Customer>(
        "SELECT id, name, phone, rewards_redeemed, created_at, updated_at FROM customer WHERE phone = ?",
    )
    .bind(phone)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, name: &str, phone: &str) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO customer (id, name, phone, rewards_redeemed, created_at, updated_at) VALUES (?1, ?2, ?3, 0, ?4, ?4)",
    )
    .bind(id)
    .bind(name)
    .bind(phone)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_phone(pool, phone)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

/// Ledger in insertion order (insertion order == chronological order)
pub async fn find_orders(pool: &SqlitePool, customer_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{} WHERE customer_id = ? ORDER BY created_at ASC, id ASC", ORDER_SELECT);
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Append a paid order to the ledger and touch the customer row.
pub async fn append_paid_order(
    pool: &SqlitePool,
    customer_id: i64,
    category: DrinkCategory,
    item_name: &str,
    item_id: i64,
    price: f64,
) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO customer_order (id, customer_id, drink_category, item_name, item_id, price, is_reward, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
    )
    .bind(id)
    .bind(customer_id)
    .bind(category)
    .bind(item_name)
    .bind(item_id)
    .bind(price)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    sqlx::query("UPDATE customer SET updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    find_order(pool, id).await
}

/// Append the free reward order and bump the cached counter, atomically.
///
/// The two writes commit together or not at all; a claim can never leave
/// the ledger and `rewards_redeemed` disagreeing.
pub async fn redeem_reward(
    pool: &SqlitePool,
    customer_id: i64,
    category: DrinkCategory,
) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO customer_order (id, customer_id, drink_category, item_name, item_id, price, is_reward, created_at) VALUES (?1, ?2, ?3, 'Free Reward', NULL, 0, 1, ?4)",
    )
    .bind(id)
    .bind(customer_id)
    .bind(category)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    let updated = sqlx::query(
        "UPDATE customer SET rewards_redeemed = rewards_redeemed + 1, updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(customer_id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {customer_id} not found")));
    }
    tx.commit().await?;

    find_order(pool, id).await
}

async fn find_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Order> {
    let sql = format!("{} WHERE id = ?", ORDER_SELECT);
    sqlx::query_as::<_, Order>(&sql)
        .bind(order_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read back order".into()))
}

/// Per-customer paid/reward order counts, derived from the ledger
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerCounts {
    pub customer_id: i64,
    pub paid_drinks: i64,
    pub reward_drinks: i64,
}

pub async fn ledger_counts_all(pool: &SqlitePool) -> RepoResult<Vec<LedgerCounts>> {
    let rows = sqlx::query_as::<_, LedgerCounts>(
        "SELECT c.id AS customer_id, \
                COALESCE(SUM(CASE WHEN o.is_reward = 0 THEN 1 ELSE 0 END), 0) AS paid_drinks, \
                COALESCE(SUM(CASE WHEN o.is_reward = 1 THEN 1 ELSE 0 END), 0) AS reward_drinks \
         FROM customer c \
         LEFT JOIN customer_order o ON o.customer_id = c.id \
         GROUP BY c.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Paid revenue summed per calendar day (UTC)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyEarnings {
    pub day: String,
    pub revenue: f64,
    pub orders: i64,
}

pub async fn earnings_between(
    pool: &SqlitePool,
    start_ms: i64,
    end_ms: i64,
) -> RepoResult<Vec<DailyEarnings>> {
    let rows = sqlx::query_as::<_, DailyEarnings>(
        "SELECT date(created_at / 1000, 'unixepoch') AS day, \
                COALESCE(SUM(price), 0) AS revenue, \
                COUNT(*) AS orders \
         FROM customer_order \
         WHERE is_reward = 0 AND created_at >= ?1 AND created_at <= ?2 \
         GROUP BY day ORDER BY day",
    )
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn test_create_and_find_by_phone() {
        let pool = test_pool().await;
        let c = create(&pool, "Alice", "611111111").await.unwrap();
        assert_eq!(c.name, "Alice");
        assert_eq!(c.rewards_redeemed, 0);

        let found = find_by_phone(&pool, "611111111").await.unwrap().unwrap();
        assert_eq!(found.id, c.id);
        assert!(find_by_phone(&pool, "699999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_rejected() {
        let pool = test_pool().await;
        create(&pool, "Alice", "611111111").await.unwrap();
        let err = create(&pool, "Alicia", "611111111").await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_append_paid_order_preserves_insertion_order() {
        let pool = test_pool().await;
        let c = create(&pool, "Alice", "611111111").await.unwrap();

        for i in 0..3 {
            append_paid_order(
                &pool,
                c.id,
                shared::models::DrinkCategory::Milkshake,
                &format!("Shake {i}"),
                100 + i,
                6.5,
            )
            .await
            .unwrap();
        }

        let orders = find_orders(&pool, c.id).await.unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].item_name, "Shake 0");
        assert_eq!(orders[2].item_name, "Shake 2");
        assert!(orders.iter().all(|o| !o.is_reward));
    }

    #[tokio::test]
    async fn test_redeem_reward_is_atomic_pair() {
        let pool = test_pool().await;
        let c = create(&pool, "Alice", "611111111").await.unwrap();
        for i in 0..5 {
            append_paid_order(
                &pool,
                c.id,
                shared::models::DrinkCategory::Mojito,
                "Classic Mojito",
                100 + i,
                8.0,
            )
            .await
            .unwrap();
        }

        let reward = redeem_reward(&pool, c.id, shared::models::DrinkCategory::Mojito)
            .await
            .unwrap();
        assert!(reward.is_reward);
        assert_eq!(reward.price, 0.0);
        assert_eq!(reward.item_name, "Free Reward");
        assert!(reward.item_id.is_none());

        // Counter and ledger agree
        let customer = find_by_phone(&pool, "611111111").await.unwrap().unwrap();
        let orders = find_orders(&pool, c.id).await.unwrap();
        let reward_count = orders.iter().filter(|o| o.is_reward).count() as i64;
        assert_eq!(customer.rewards_redeemed, 1);
        assert_eq!(customer.rewards_redeemed, reward_count);
    }

    #[tokio::test]
    async fn test_redeem_reward_unknown_customer() {
        let pool = test_pool().await;
        let err = redeem_reward(&pool, 9999, shared::models::DrinkCategory::Waffle)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ledger_counts_all() {
        let pool = test_pool().await;
        let a = create(&pool, "Alice", "611111111").await.unwrap();
        let b = create(&pool, "Bob", "622222222").await.unwrap();

        for i in 0..5 {
            append_paid_order(&pool, a.id, shared::models::DrinkCategory::Waffle, "Waffle", 100 + i, 5.0)
                .await
                .unwrap();
        }
        redeem_reward(&pool, a.id, shared::models::DrinkCategory::Waffle).await.unwrap();

        let counts = ledger_counts_all(&pool).await.unwrap();
        let of = |id: i64| counts.iter().find(|c| c.customer_id == id).unwrap();
        assert_eq!(of(a.id).paid_drinks, 5);
        assert_eq!(of(a.id).reward_drinks, 1);
        // Customer with empty ledger still appears, zeroed
        assert_eq!(of(b.id).paid_drinks, 0);
        assert_eq!(of(b.id).reward_drinks, 0);
    }

    #[tokio::test]
    async fn test_earnings_exclude_rewards() {
        let pool = test_pool().await;
        let c = create(&pool, "Alice", "611111111").await.unwrap();
        for i in 0..5 {
            append_paid_order(&pool, c.id, shared::models::DrinkCategory::IceCream, "Sundae", 100 + i, 4.0)
                .await
                .unwrap();
        }
        redeem_reward(&pool, c.id, shared::models::DrinkCategory::IceCream).await.unwrap();

        let now = shared::util::now_millis();
        let days = earnings_between(&pool, now - 86_400_000, now + 86_400_000)
            .await
            .unwrap();
        let total: f64 = days.iter().map(|d| d.revenue).sum();
        let orders: i64 = days.iter().map(|d| d.orders).sum();
        // 5 paid at 4.0; the free reward contributes nothing
        assert!((total - 20.0).abs() < f64::EPSILON);
        assert_eq!(orders, 5);
    }
}
