//! Customer API Handlers
//!
//! Purchases and reward claims go through the loyalty service; this layer
//! only shapes requests and responses.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{ClaimRequest, CustomerDetail, CustomerLookup, PurchaseRequest};

#[derive(serde::Deserialize)]
pub struct LookupQuery {
    pub phone: String,
}

/// Purchase response: updated customer plus the reward flag.
///
/// The flag is always false: purchases never auto-mint a reward. A
/// completed cycle shows up as `status.state == "ready"` instead.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    #[serde(flatten)]
    pub customer: CustomerDetail,
    pub is_reward: bool,
}

/// GET /api/customers - 获取所有客户 (含账本与奖励状态)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<CustomerDetail>>> {
    let details = state.loyalty.all_details().await?;
    Ok(Json(details))
}

/// GET /api/customers/lookup?phone=xxx - 客户自助查询
pub async fn lookup(
    State(state): State<ServerState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<CustomerLookup>> {
    let view = state.loyalty.lookup(&query.phone).await?;
    Ok(Json(view))
}

/// POST /api/customers/purchase - 记录一笔购买
pub async fn purchase(
    State(state): State<ServerState>,
    Json(payload): Json<PurchaseRequest>,
) -> AppResult<Json<PurchaseResponse>> {
    let customer = state.loyalty.record_purchase(&payload).await?;
    Ok(Json(PurchaseResponse {
        customer,
        is_reward: false,
    }))
}

/// POST /api/customers/claim-reward - 兑换奖励
pub async fn claim_reward(
    State(state): State<ServerState>,
    Json(payload): Json<ClaimRequest>,
) -> AppResult<Json<CustomerDetail>> {
    let customer = state.loyalty.claim_reward(&payload.phone).await?;
    Ok(Json(customer))
}
