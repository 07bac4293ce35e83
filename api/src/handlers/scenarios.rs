//! Scenario handlers
//!
//! Saved calculations of the signed-in user.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{
    AuthUser, CalculatorInputs, CalculatorOutputs, RoiSeverity, SaveOutcome, Scenario, ScenarioId,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing scenarios
#[derive(Debug, Deserialize)]
pub struct ListScenariosQuery {
    pub search: Option<String>,
}

/// Request body for saving a scenario
#[derive(Debug, Deserialize)]
pub struct SaveScenarioRequest {
    /// Blank or missing gets a timestamped default
    #[serde(default)]
    pub name: String,
    pub inputs: CalculatorInputs,
    /// Computed from `inputs` when omitted
    pub outputs: Option<CalculatorOutputs>,
}

/// Request body for renaming a scenario
#[derive(Debug, Deserialize)]
pub struct RenameScenarioRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct ScenarioResponse {
    pub id: String,
    pub name: String,
    pub inputs: CalculatorInputs,
    pub outputs: CalculatorOutputs,
    pub severity: RoiSeverity,
    pub updated_at: String,
}

impl From<Scenario> for ScenarioResponse {
    fn from(s: Scenario) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name,
            severity: s.outputs.severity(),
            inputs: s.inputs,
            outputs: s.outputs,
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct SaveScenarioResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioResponse>,
}

impl From<SaveOutcome> for SaveScenarioResponse {
    fn from(outcome: SaveOutcome) -> Self {
        Self {
            success: outcome.success,
            reason: outcome.reason,
            scenario: outcome.scenario.map(Into::into),
        }
    }
}

/// GET /scenarios?search=
pub async fn list_scenarios(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListScenariosQuery>,
) -> Result<Json<Vec<ScenarioResponse>>, AppError> {
    let scenarios = state
        .scenario_service
        .list(&user, query.search.as_deref())
        .await?;

    Ok(Json(scenarios.into_iter().map(Into::into).collect()))
}

/// POST /scenarios
///
/// Hitting the scenario ceiling is a 200 with `success: false`.
pub async fn save_scenario(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SaveScenarioRequest>,
) -> Result<Json<SaveScenarioResponse>, AppError> {
    let outcome = state
        .scenario_service
        .save(&user, &request.name, request.inputs, request.outputs)
        .await?;

    Ok(Json(outcome.into()))
}

/// GET /scenarios/:id
pub async fn get_scenario(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScenarioResponse>, AppError> {
    let scenario = state.scenario_service.get(&user, &ScenarioId(id)).await?;
    Ok(Json(scenario.into()))
}

/// PATCH /scenarios/:id
pub async fn rename_scenario(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RenameScenarioRequest>,
) -> Result<Json<ScenarioResponse>, AppError> {
    let scenario = state
        .scenario_service
        .rename(&user, &ScenarioId(id), &request.name)
        .await?;
    Ok(Json(scenario.into()))
}

/// DELETE /scenarios/:id
pub async fn delete_scenario(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .scenario_service
        .delete(&user, &ScenarioId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
