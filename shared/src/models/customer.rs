//! Customer & Order Models
//!
//! A customer owns an append-only ledger of orders keyed by phone number.
//! `rewards_redeemed` is a cached counter that must always equal the number
//! of reward orders in the ledger.

use serde::{Deserialize, Serialize};

/// Drink category (closed set; extending requires policy review)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum DrinkCategory {
    Mojito,
    #[serde(rename = "Ice Cream")]
    #[cfg_attr(feature = "db", sqlx(rename = "Ice Cream"))]
    IceCream,
    Milkshake,
    Waffle,
}

impl DrinkCategory {
    pub const ALL: [DrinkCategory; 4] = [
        DrinkCategory::Mojito,
        DrinkCategory::IceCream,
        DrinkCategory::Milkshake,
        DrinkCategory::Waffle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DrinkCategory::Mojito => "Mojito",
            DrinkCategory::IceCream => "Ice Cream",
            DrinkCategory::Milkshake => "Milkshake",
            DrinkCategory::Waffle => "Waffle",
        }
    }
}

impl std::fmt::Display for DrinkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    /// Cached count of reward orders in the ledger
    pub rewards_redeemed: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A single purchase or reward redemption (immutable once created)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub drink_category: DrinkCategory,
    pub item_name: String,
    /// Menu item reference; None only for reward orders
    pub item_id: Option<i64>,
    /// 0.0 exactly when `is_reward` is true, catalog price otherwise
    pub price: f64,
    pub is_reward: bool,
    pub created_at: i64,
}

/// Reward cycle state of a customer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RewardState {
    /// Somewhere inside the 5-drink cycle (including zero drinks)
    Progress,
    /// Exactly one paid drink away from a reward
    Upcoming,
    /// A full unclaimed cycle has accumulated
    Ready,
}

/// Derived reward status, recomputed from the ledger on every read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewardStatus {
    pub paid_drinks: i64,
    /// Paid drinks not yet consumed by a past claim, clamped to ≥ 0
    pub effective_paid_drinks: i64,
    /// `effective_paid_drinks % 5`
    pub progress: i64,
    pub drinks_until_reward: i64,
    pub state: RewardState,
}

/// Customer with ledger and derived status (detail/response view)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub orders: Vec<Order>,
    pub total_orders: i64,
    pub status: RewardStatus,
}

/// Self-service lookup view (public endpoint; no ledger exposure)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLookup {
    pub name: String,
    pub phone: String,
    pub total_drinks: i64,
    pub rewards_redeemed: i64,
    pub upcoming_reward: bool,
    pub drinks_to_next_reward: i64,
    pub last_order_date: Option<i64>,
}

/// Record-purchase payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub drink_type: DrinkCategory,
    pub item_id: i64,
    pub item_name: String,
    pub price: f64,
}

/// Claim-reward payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub phone: String,
}
