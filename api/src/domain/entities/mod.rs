//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod calculation;
pub mod plan;
pub mod scenario;
pub mod usage;
pub mod user;

pub use calculation::{calculate, CalculatorInputs, CalculatorOutputs, RoiSeverity};
pub use plan::{Profile, Tier};
pub use scenario::{
    default_scenario_name, NewScenario, SaveOutcome, Scenario, ScenarioId, MAX_SCENARIO_NAME_LEN,
};
pub use usage::{MonthKey, UsageDecision, UsageMonthly};
pub use user::{AuthSession, AuthUser, UserId};
