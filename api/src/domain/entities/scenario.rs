//! Scenario domain entity
//!
//! A scenario is a named snapshot of one calculation (inputs and outputs)
//! saved by a user. Only the name can change after it is saved.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CalculatorInputs, CalculatorOutputs, UserId};

/// Longest accepted scenario name, in characters
pub const MAX_SCENARIO_NAME_LEN: usize = 120;

/// Unique identifier for a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioId(pub Uuid);

impl ScenarioId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScenarioId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ScenarioId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A saved calculation
#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub user_id: UserId,
    pub name: String,
    pub inputs: CalculatorInputs,
    pub outputs: CalculatorOutputs,
    pub updated_at: DateTime<Utc>,
}

impl Scenario {
    /// Case-insensitive substring match on the name
    pub fn name_matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Data needed to save a new scenario
#[derive(Debug, Clone)]
pub struct NewScenario {
    pub user_id: UserId,
    pub name: String,
    pub inputs: CalculatorInputs,
    pub outputs: CalculatorOutputs,
}

/// Result of a save attempt. Hitting the quota is not an error.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
}

impl SaveOutcome {
    pub fn saved(scenario: Scenario) -> Self {
        Self {
            success: true,
            reason: None,
            scenario: Some(scenario),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            scenario: None,
        }
    }
}

/// Name given to a scenario saved without one, e.g. `Scenario 2025-03-09 14:05`
pub fn default_scenario_name(at: NaiveDateTime) -> String {
    format!("Scenario {}", at.format("%Y-%m-%d %H:%M"))
}
