//! Plan descriptions
//!
//! Public listing of tier limits; quota denials point here.

use axum::Json;
use serde::Serialize;

use crate::domain::entities::Tier;

#[derive(Serialize)]
pub struct PlanResponse {
    pub tier: Tier,
    /// `None` when unlimited
    pub calcs_per_month: Option<u32>,
    pub max_scenarios: Option<u64>,
}

impl From<Tier> for PlanResponse {
    fn from(tier: Tier) -> Self {
        Self {
            tier,
            calcs_per_month: tier.max_calcs_per_month(),
            max_scenarios: tier.max_scenarios(),
        }
    }
}

/// GET /plans
pub async fn list_plans() -> Json<Vec<PlanResponse>> {
    Json(Tier::all().into_iter().map(PlanResponse::from).collect())
}
