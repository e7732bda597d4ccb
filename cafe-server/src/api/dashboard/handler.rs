//! Dashboard API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::customer;
use crate::loyalty::policy;
use crate::utils::{AppError, AppResult};
use shared::models::RewardState;

// ============================================================================
// Response Types
// ============================================================================

/// Recent customer summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCustomer {
    pub name: String,
    pub phone: String,
    pub total_orders: i64,
}

/// Overview statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: i64,
    pub total_drinks_sold: i64,
    pub upcoming_rewards: i64,
    pub rewards_redeemed: i64,
    pub recent_customers: Vec<RecentCustomer>,
}

/// Daily revenue data point
#[derive(Debug, Clone, Serialize)]
pub struct EarningsDay {
    pub day: String,
    pub revenue: f64,
    pub orders: i64,
}

/// Earnings report over a date range (paid orders only)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsResponse {
    pub start_date: String,
    pub end_date: String,
    pub total_revenue: f64,
    pub total_orders: i64,
    pub days: Vec<EarningsDay>,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EarningsQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("{field} must be YYYY-MM-DD")))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/dashboard/stats - 总览统计
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<DashboardStats>> {
    let customers = customer::find_all(&state.pool).await?;
    let counts = customer::ledger_counts_all(&state.pool).await?;

    let total_drinks_sold: i64 = counts.iter().map(|c| c.paid_drinks + c.reward_drinks).sum();
    let rewards_redeemed: i64 = counts.iter().map(|c| c.reward_drinks).sum();
    let upcoming_rewards = counts
        .iter()
        .filter(|c| {
            policy::compute_status(c.paid_drinks, c.reward_drinks).state == RewardState::Upcoming
        })
        .count() as i64;

    // find_all is ordered by last activity; take the five most recent
    let by_id: std::collections::HashMap<i64, i64> = counts
        .iter()
        .map(|c| (c.customer_id, c.paid_drinks + c.reward_drinks))
        .collect();
    let recent_customers = customers
        .iter()
        .take(5)
        .map(|c| RecentCustomer {
            name: c.name.clone(),
            phone: c.phone.clone(),
            total_orders: by_id.get(&c.id).copied().unwrap_or(0),
        })
        .collect();

    Ok(Json(DashboardStats {
        total_customers: customers.len() as i64,
        total_drinks_sold,
        upcoming_rewards,
        rewards_redeemed,
        recent_customers,
    }))
}

/// GET /api/dashboard/earnings?startDate=&endDate= - 按日营收汇总
///
/// 默认统计最近 30 天；奖励订单 (price = 0) 不计入。
pub async fn earnings(
    State(state): State<ServerState>,
    Query(query): Query<EarningsQuery>,
) -> AppResult<Json<EarningsResponse>> {
    let today = Utc::now().date_naive();
    let start = match &query.start_date {
        Some(s) => parse_date(s, "startDate")?,
        None => today - Duration::days(30),
    };
    let end = match &query.end_date {
        Some(s) => parse_date(s, "endDate")?,
        None => today,
    };
    if start > end {
        return Err(AppError::validation("startDate must not be after endDate"));
    }

    let start_ms = start.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp_millis();
    let end_ms = end
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_default()
        .and_utc()
        .timestamp_millis();

    let days: Vec<EarningsDay> = customer::earnings_between(&state.pool, start_ms, end_ms)
        .await?
        .into_iter()
        .map(|d| EarningsDay {
            day: d.day,
            revenue: d.revenue,
            orders: d.orders,
        })
        .collect();

    Ok(Json(EarningsResponse {
        start_date: start.to_string(),
        end_date: end.to_string(),
        total_revenue: days.iter().map(|d| d.revenue).sum(),
        total_orders: days.iter().map(|d| d.orders).sum(),
        days,
    }))
}
