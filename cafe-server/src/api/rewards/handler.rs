//! Rewards API Handlers
//!
//! Dashboard view over every customer's reward status. Counts come from
//! the ledger (single grouped query), status from the policy module.
//! The cached counter column is never used for derivation here.

use std::collections::HashMap;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::customer;
use crate::loyalty::policy;
use crate::utils::AppResult;
use shared::models::{RewardState, RewardStatus};

/// Per-customer reward row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardCustomer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub total_orders: i64,
    pub rewards_redeemed: i64,
    #[serde(flatten)]
    pub status: RewardStatus,
}

/// Aggregate counts across all customers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardStats {
    pub total_rewards_given: i64,
    pub customers_with_rewards: i64,
    pub upcoming_rewards: i64,
    pub ready_rewards: i64,
}

/// Full rewards overview response
#[derive(Debug, Clone, Serialize)]
pub struct RewardsResponse {
    pub customers: Vec<RewardCustomer>,
    pub stats: RewardStats,
}

/// GET /api/rewards - 奖励看板
pub async fn overview(State(state): State<ServerState>) -> AppResult<Json<RewardsResponse>> {
    let customers = customer::find_all(&state.pool).await?;
    let counts: HashMap<i64, _> = customer::ledger_counts_all(&state.pool)
        .await?
        .into_iter()
        .map(|c| (c.customer_id, c))
        .collect();

    let mut rows = Vec::with_capacity(customers.len());
    for c in customers {
        let (paid, rewards) = counts
            .get(&c.id)
            .map(|lc| (lc.paid_drinks, lc.reward_drinks))
            .unwrap_or((0, 0));
        let status = policy::compute_status(paid, rewards);
        rows.push(RewardCustomer {
            id: c.id,
            name: c.name,
            phone: c.phone,
            total_orders: paid + rewards,
            rewards_redeemed: rewards,
            status,
        });
    }

    let stats = RewardStats {
        total_rewards_given: rows.iter().map(|r| r.rewards_redeemed).sum(),
        customers_with_rewards: rows.iter().filter(|r| r.rewards_redeemed > 0).count() as i64,
        upcoming_rewards: rows
            .iter()
            .filter(|r| r.status.state == RewardState::Upcoming)
            .count() as i64,
        ready_rewards: rows
            .iter()
            .filter(|r| r.status.state == RewardState::Ready)
            .count() as i64,
    };

    Ok(Json(RewardsResponse {
        customers: rows,
        stats,
    }))
}
