//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems.

pub mod auth_service;
pub mod calculator_service;
pub mod scenario_service;
pub mod usage_service;

pub use auth_service::{AuthService, MagicLinkRequest};
pub use calculator_service::{CalculationOutcome, CalculatorService};
pub use scenario_service::{ScenarioQuota, ScenarioService};
pub use usage_service::{MonthlyUsage, UsageService};
