//! Calculator and usage handlers

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::app::CalculationOutcome;
use crate::domain::entities::{AuthUser, CalculatorInputs, MonthKey, Tier};
use crate::error::AppError;
use crate::AppState;

/// Where denied callers are sent to upgrade
pub const UPGRADE_PATH: &str = "/plans";

#[derive(Serialize)]
pub struct CalculateResponse {
    #[serde(flatten)]
    pub outcome: CalculationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_path: Option<&'static str>,
}

impl From<CalculationOutcome> for CalculateResponse {
    fn from(outcome: CalculationOutcome) -> Self {
        let upgrade_path = (!outcome.allowed).then_some(UPGRADE_PATH);
        Self {
            outcome,
            upgrade_path,
        }
    }
}

/// Calculation and scenario usage for the signed-in user
#[derive(Serialize)]
pub struct UsageSummary {
    pub tier: Tier,
    pub month: MonthKey,
    pub calc_count: i32,
    pub calc_limit: Option<u32>,
    pub remaining: Option<u32>,
    pub scenario_count: u64,
    pub scenario_limit: Option<u64>,
}

/// POST /calculate
///
/// Counts against the monthly quota. A denial is a 200 with `allowed: false`.
pub async fn calculate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(inputs): Json<CalculatorInputs>,
) -> Result<Json<CalculateResponse>, AppError> {
    let outcome = state.calculator_service.run(&user, &inputs).await?;
    Ok(Json(outcome.into()))
}

/// GET /usage
pub async fn usage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UsageSummary>, AppError> {
    let monthly = state.usage_service.monthly_usage(&user).await?;
    let scenarios = state.scenario_service.quota(&user).await?;

    Ok(Json(UsageSummary {
        tier: monthly.tier,
        month: monthly.month,
        calc_count: monthly.calc_count,
        calc_limit: monthly.calc_limit,
        remaining: monthly.remaining,
        scenario_count: scenarios.count,
        scenario_limit: scenarios.limit,
    }))
}
