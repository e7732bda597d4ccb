//! Loyalty Service
//!
//! Orchestrates the order ledger: recording purchases, claiming rewards,
//! and building customer detail views. All writes for one customer run
//! under that customer's phone lock; reads are lock-free.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::repository::{customer, menu_item};
use crate::loyalty::locks::CustomerLocks;
use crate::loyalty::policy;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_positive_price, validate_required_text,
};
use shared::models::{Customer, CustomerDetail, CustomerLookup, PurchaseRequest, RewardState};
use shared::{AppError, AppResult};

#[derive(Clone)]
pub struct LoyaltyService {
    pool: SqlitePool,
    locks: Arc<CustomerLocks>,
}

impl LoyaltyService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: Arc::new(CustomerLocks::new()),
        }
    }

    /// Connection pool accessor (repositories take the pool directly)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Record a paid purchase, creating the customer on first sight.
    ///
    /// Reward issuance never happens here; a completed cycle only changes
    /// the derived status to `ready` until an explicit claim.
    pub async fn record_purchase(&self, req: &PurchaseRequest) -> AppResult<CustomerDetail> {
        validate_required_text(&req.customer_name, "customerName", MAX_NAME_LEN)?;
        validate_required_text(&req.customer_phone, "customerPhone", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&req.item_name, "itemName", MAX_NAME_LEN)?;
        validate_positive_price(req.price, "price")?;

        let item = menu_item::find_by_id(&self.pool, req.item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Menu item {}", req.item_id)))?;
        if !item.is_active {
            return Err(AppError::validation(format!(
                "Menu item '{}' is not available",
                item.name
            )));
        }
        if item.category != req.drink_type {
            tracing::warn!(
                item_id = item.id,
                requested = %req.drink_type,
                catalog = %item.category,
                "drinkType differs from catalog category, recording requested value"
            );
        }

        let phone = req.customer_phone.trim();
        let lock = self.locks.acquire(phone);
        let _guard = lock.lock().await;

        let cust = match customer::find_by_phone(&self.pool, phone).await? {
            Some(c) => c,
            None => {
                tracing::info!(phone = %phone, "First purchase, creating customer");
                customer::create(&self.pool, req.customer_name.trim(), phone).await?
            }
        };

        // Stored price is the catalog price, not whatever the client sent
        let order = customer::append_paid_order(
            &self.pool,
            cust.id,
            req.drink_type,
            &req.item_name,
            item.id,
            item.price,
        )
        .await?;

        tracing::info!(
            customer_id = cust.id,
            order_id = order.id,
            item = %req.item_name,
            price = item.price,
            "Purchase recorded"
        );

        self.detail_by_phone_locked(phone).await
    }

    /// Convert a `ready` status into a recorded free-reward order.
    ///
    /// Appending the reward order and bumping the cached counter happen in
    /// one transaction; a rejected claim leaves the ledger untouched.
    pub async fn claim_reward(&self, phone: &str) -> AppResult<CustomerDetail> {
        validate_required_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
        let phone = phone.trim();

        let lock = self.locks.acquire(phone);
        let _guard = lock.lock().await;

        let cust = customer::find_by_phone(&self.pool, phone)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Customer {phone}")))?;

        let orders = customer::find_orders(&self.pool, cust.id).await?;
        let status = policy::status_from_ledger(&orders);

        if status.state != RewardState::Ready {
            return Err(AppError::precondition_failed(format!(
                "Reward not ready: {} more paid drink(s) needed",
                status.drinks_until_reward
            )));
        }

        // The comped drink belongs to the cycle just completed: reuse the
        // category of the most recent paid order (ready ⇒ one exists).
        let category = orders
            .iter()
            .rev()
            .find(|o| !o.is_reward)
            .map(|o| o.drink_category)
            .ok_or_else(|| AppError::internal("Ready status with no paid orders".to_string()))?;

        let reward = customer::redeem_reward(&self.pool, cust.id, category).await?;

        tracing::info!(
            customer_id = cust.id,
            order_id = reward.id,
            "Reward claimed"
        );

        self.detail_by_phone_locked(phone).await
    }

    /// Customer detail with ledger and derived status
    pub async fn detail_by_phone(&self, phone: &str) -> AppResult<CustomerDetail> {
        validate_required_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
        self.detail_by_phone_locked(phone.trim()).await
    }

    /// Self-service lookup view (no ledger exposure)
    pub async fn lookup(&self, phone: &str) -> AppResult<CustomerLookup> {
        let detail = self.detail_by_phone(phone).await?;
        Ok(CustomerLookup {
            name: detail.customer.name.clone(),
            phone: detail.customer.phone.clone(),
            total_drinks: detail.total_orders,
            rewards_redeemed: detail.customer.rewards_redeemed,
            upcoming_reward: detail.status.state == RewardState::Ready,
            drinks_to_next_reward: detail.status.drinks_until_reward,
            last_order_date: detail.orders.last().map(|o| o.created_at),
        })
    }

    /// All customers with full detail (admin dashboard)
    pub async fn all_details(&self) -> AppResult<Vec<CustomerDetail>> {
        let customers = customer::find_all(&self.pool).await?;
        let mut details = Vec::with_capacity(customers.len());
        for c in customers {
            details.push(self.build_detail(c).await?);
        }
        Ok(details)
    }

    async fn detail_by_phone_locked(&self, phone: &str) -> AppResult<CustomerDetail> {
        let cust = customer::find_by_phone(&self.pool, phone)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Customer {phone}")))?;
        self.build_detail(cust).await
    }

    async fn build_detail(&self, cust: Customer) -> AppResult<CustomerDetail> {
        let orders = customer::find_orders(&self.pool, cust.id).await?;
        let status = policy::status_from_ledger(&orders);

        // The stored counter is a cache; the ledger is the source of truth
        let ledger_rewards = policy::rewards_in_ledger(&orders);
        if cust.rewards_redeemed != ledger_rewards {
            tracing::warn!(
                customer_id = cust.id,
                cached = cust.rewards_redeemed,
                ledger = ledger_rewards,
                "rewards_redeemed counter drifted from ledger"
            );
        }

        let total_orders = orders.len() as i64;
        Ok(CustomerDetail {
            customer: cust,
            orders,
            total_orders,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use shared::models::{DrinkCategory, MenuItem, MenuItemCreate};

    async fn seed_item(pool: &SqlitePool, name: &str, category: DrinkCategory, price: f64) -> MenuItem {
        menu_item::create(
            pool,
            MenuItemCreate {
                name: name.to_string(),
                category,
                price,
                image: None,
                description: None,
            },
        )
        .await
        .unwrap()
    }

    fn purchase_of(item: &MenuItem, phone: &str) -> PurchaseRequest {
        PurchaseRequest {
            customer_name: "Alice".to_string(),
            customer_phone: phone.to_string(),
            drink_type: item.category,
            item_id: item.id,
            item_name: item.name.clone(),
            price: item.price,
        }
    }

    async fn service_with_item() -> (LoyaltyService, MenuItem) {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Classic Mojito", DrinkCategory::Mojito, 70.0).await;
        (LoyaltyService::new(pool), item)
    }

    #[tokio::test]
    async fn test_first_purchase_creates_customer() {
        let (svc, item) = service_with_item().await;

        let detail = svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap();
        assert_eq!(detail.customer.name, "Alice");
        assert_eq!(detail.total_orders, 1);
        assert_eq!(detail.orders.len(), 1);
        assert!(!detail.orders[0].is_reward);
        assert_eq!(detail.status.state, RewardState::Progress);
        assert_eq!(detail.status.drinks_until_reward, 4);
    }

    #[tokio::test]
    async fn test_purchase_unknown_item_is_not_found() {
        let (svc, item) = service_with_item().await;
        let mut req = purchase_of(&item, "611111111");
        req.item_id = 999_999;
        let err = svc.record_purchase(&req).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_purchase_inactive_item_is_rejected() {
        let (svc, item) = service_with_item().await;
        menu_item::set_active(svc.pool(), item.id, false).await.unwrap();
        let err = svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_purchase_invalid_fields_are_rejected() {
        let (svc, item) = service_with_item().await;

        let mut req = purchase_of(&item, "611111111");
        req.customer_name = "  ".to_string();
        assert!(matches!(
            svc.record_purchase(&req).await.unwrap_err(),
            AppError::Validation(_)
        ));

        let mut req = purchase_of(&item, "611111111");
        req.price = 0.0;
        assert!(matches!(
            svc.record_purchase(&req).await.unwrap_err(),
            AppError::Validation(_)
        ));

        let mut req = purchase_of(&item, "611111111");
        req.customer_phone = "".to_string();
        assert!(matches!(
            svc.record_purchase(&req).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_stored_price_is_catalog_price() {
        let (svc, item) = service_with_item().await;
        let mut req = purchase_of(&item, "611111111");
        req.price = 1.0; // client-sent price is ignored for storage
        let detail = svc.record_purchase(&req).await.unwrap();
        assert!((detail.orders[0].price - 70.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_four_then_five_purchases() {
        // Scenarios A and B
        let (svc, item) = service_with_item().await;

        let mut detail = None;
        for _ in 0..4 {
            detail = Some(svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap());
        }
        let d = detail.unwrap();
        assert_eq!(d.status.paid_drinks, 4);
        assert_eq!(d.status.effective_paid_drinks, 4);
        assert_eq!(d.status.progress, 4);
        assert_eq!(d.status.state, RewardState::Upcoming);
        assert_eq!(d.status.drinks_until_reward, 1);

        let d = svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap();
        assert_eq!(d.status.effective_paid_drinks, 5);
        assert_eq!(d.status.progress, 0);
        assert_eq!(d.status.state, RewardState::Ready);
        assert_eq!(d.status.drinks_until_reward, 0);
    }

    #[tokio::test]
    async fn test_claim_appends_reward_and_resets_cycle() {
        // Scenario C
        let (svc, item) = service_with_item().await;
        for _ in 0..5 {
            svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap();
        }

        let d = svc.claim_reward("611111111").await.unwrap();

        let reward = d.orders.last().unwrap();
        assert!(reward.is_reward);
        assert_eq!(reward.price, 0.0);
        assert_eq!(reward.item_name, "Free Reward");
        assert!(reward.item_id.is_none());
        assert_eq!(reward.drink_category, DrinkCategory::Mojito);

        assert_eq!(d.customer.rewards_redeemed, 1);
        assert_eq!(d.status.paid_drinks, 5);
        assert_eq!(d.status.effective_paid_drinks, 0);
        assert_eq!(d.status.progress, 0);
        assert_eq!(d.status.state, RewardState::Progress);

        // Invariants: counter mirrors ledger; rewards are free
        let ledger_rewards = d.orders.iter().filter(|o| o.is_reward).count() as i64;
        assert_eq!(d.customer.rewards_redeemed, ledger_rewards);
        assert!(d.orders.iter().all(|o| !o.is_reward || o.price == 0.0));
    }

    #[tokio::test]
    async fn test_double_claim_is_rejected() {
        // Idempotence boundary: the second claim must fail, not no-op
        let (svc, item) = service_with_item().await;
        for _ in 0..5 {
            svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap();
        }
        svc.claim_reward("611111111").await.unwrap();

        let err = svc.claim_reward("611111111").await.unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));

        // Ledger unchanged by the rejected claim
        let d = svc.detail_by_phone("611111111").await.unwrap();
        assert_eq!(d.total_orders, 6);
        assert_eq!(d.customer.rewards_redeemed, 1);
    }

    #[tokio::test]
    async fn test_claim_outside_ready_is_rejected() {
        // Scenario D: progress and upcoming states both reject
        let (svc, item) = service_with_item().await;

        for expected_orders in 1..=4 {
            svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap();
            let err = svc.claim_reward("611111111").await.unwrap_err();
            assert!(matches!(err, AppError::PreconditionFailed(_)));
            let d = svc.detail_by_phone("611111111").await.unwrap();
            assert_eq!(d.total_orders, expected_orders);
        }
    }

    #[tokio::test]
    async fn test_claim_unknown_customer_is_not_found() {
        let (svc, _item) = service_with_item().await;
        let err = svc.claim_reward("699999999").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_twelve_purchases_two_claims() {
        // Scenario E: 12 paid with 2 claims → effective 2
        let (svc, item) = service_with_item().await;
        let buy = |n: usize| {
            let svc = svc.clone();
            let item = item.clone();
            async move {
                for _ in 0..n {
                    svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap();
                }
            }
        };

        buy(5).await;
        svc.claim_reward("611111111").await.unwrap();
        buy(5).await;
        svc.claim_reward("611111111").await.unwrap();
        buy(2).await;

        let d = svc.detail_by_phone("611111111").await.unwrap();
        assert_eq!(d.status.paid_drinks, 12);
        assert_eq!(d.status.effective_paid_drinks, 2);
        assert_eq!(d.status.progress, 2);
        assert_eq!(d.status.drinks_until_reward, 3);
        assert_eq!(d.status.state, RewardState::Progress);
        assert_eq!(d.customer.rewards_redeemed, 2);
        assert_eq!(d.total_orders, 14);
    }

    #[tokio::test]
    async fn test_banked_cycles_claim_one_at_a_time() {
        // 10 paid, no claims → ready; first claim leaves another full cycle
        let (svc, item) = service_with_item().await;
        for _ in 0..10 {
            svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap();
        }

        let d = svc.claim_reward("611111111").await.unwrap();
        assert_eq!(d.status.effective_paid_drinks, 5);
        assert_eq!(d.status.state, RewardState::Ready);

        let d = svc.claim_reward("611111111").await.unwrap();
        assert_eq!(d.status.effective_paid_drinks, 0);
        assert_eq!(d.status.state, RewardState::Progress);
        assert_eq!(d.customer.rewards_redeemed, 2);
    }

    #[tokio::test]
    async fn test_reward_category_follows_last_paid_order() {
        let pool = test_pool().await;
        let mojito = seed_item(&pool, "Classic Mojito", DrinkCategory::Mojito, 8.0).await;
        let waffle = seed_item(&pool, "Berry Waffle", DrinkCategory::Waffle, 7.0).await;
        let svc = LoyaltyService::new(pool);

        for _ in 0..4 {
            svc.record_purchase(&purchase_of(&mojito, "611111111")).await.unwrap();
        }
        svc.record_purchase(&purchase_of(&waffle, "611111111")).await.unwrap();

        let d = svc.claim_reward("611111111").await.unwrap();
        assert_eq!(d.orders.last().unwrap().drink_category, DrinkCategory::Waffle);
    }

    #[tokio::test]
    async fn test_lookup_view() {
        let (svc, item) = service_with_item().await;
        for _ in 0..5 {
            svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap();
        }

        let lookup = svc.lookup("611111111").await.unwrap();
        assert_eq!(lookup.total_drinks, 5);
        assert_eq!(lookup.rewards_redeemed, 0);
        assert!(lookup.upcoming_reward);
        assert_eq!(lookup.drinks_to_next_reward, 0);
        assert!(lookup.last_order_date.is_some());

        let err = svc.lookup("699999999").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_purchases_serialize_per_phone() {
        let (svc, item) = service_with_item().await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let svc = svc.clone();
            let req = purchase_of(&item, "611111111");
            handles.push(tokio::spawn(async move {
                svc.record_purchase(&req).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let d = svc.detail_by_phone("611111111").await.unwrap();
        assert_eq!(d.total_orders, 8);
        assert_eq!(d.status.paid_drinks, 8);
        // Exactly one customer row was created despite the race
        let all = customer::find_all(svc.pool()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_racing_claim_stays_consistent() {
        let (svc, item) = service_with_item().await;
        for _ in 0..5 {
            svc.record_purchase(&purchase_of(&item, "611111111")).await.unwrap();
        }

        let claim = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.claim_reward("611111111").await })
        };
        let buy = {
            let svc = svc.clone();
            let req = purchase_of(&item, "611111111");
            tokio::spawn(async move { svc.record_purchase(&req).await })
        };

        let claim_result = claim.await.unwrap();
        buy.await.unwrap().unwrap();

        // Whatever the interleaving, counter and ledger agree afterwards
        let d = svc.detail_by_phone("611111111").await.unwrap();
        let ledger_rewards = d.orders.iter().filter(|o| o.is_reward).count() as i64;
        assert_eq!(d.customer.rewards_redeemed, ledger_rewards);
        assert_eq!(d.status.paid_drinks, 6);

        // If the claim won the lock it succeeded from ready; if the purchase
        // got there first (6th drink), the claim was correctly rejected
        match claim_result {
            Ok(_) => assert_eq!(d.customer.rewards_redeemed, 1),
            Err(AppError::PreconditionFailed(_)) => assert_eq!(d.customer.rewards_redeemed, 0),
            Err(e) => panic!("unexpected claim error: {e}"),
        }
    }
}
