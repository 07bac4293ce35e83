//! Calculator service
//!
//! Runs the profitability calculation behind the monthly usage gate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::usage_service::UsageService;
use crate::domain::entities::{
    calculate, AuthUser, CalculatorInputs, CalculatorOutputs, RoiSeverity,
};
use crate::domain::ports::{ProfileRepository, UsageRepository};
use crate::error::AppError;

/// Result of a gated calculation. `outputs` is only present when allowed.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationOutcome {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<CalculatorOutputs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<RoiSeverity>,
}

pub struct CalculatorService<PR, UR>
where
    PR: ProfileRepository,
    UR: UsageRepository,
{
    usage: Arc<UsageService<PR, UR>>,
}

impl<PR, UR> CalculatorService<PR, UR>
where
    PR: ProfileRepository,
    UR: UsageRepository,
{
    pub fn new(usage: Arc<UsageService<PR, UR>>) -> Self {
        Self { usage }
    }

    /// Count the calculation against the user's quota, then compute.
    ///
    /// A denied gate skips the computation entirely.
    pub async fn run(
        &self,
        user: &AuthUser,
        inputs: &CalculatorInputs,
    ) -> Result<CalculationOutcome, AppError> {
        self.run_at(user, inputs, Utc::now()).await
    }

    pub async fn run_at(
        &self,
        user: &AuthUser,
        inputs: &CalculatorInputs,
        now: DateTime<Utc>,
    ) -> Result<CalculationOutcome, AppError> {
        let decision = self.usage.check_and_increment_at(user, now).await?;

        if !decision.allowed {
            return Ok(CalculationOutcome {
                allowed: false,
                reason: decision.reason,
                outputs: None,
                severity: None,
            });
        }

        let outputs = calculate(inputs);
        tracing::debug!(
            user_id = %user.id,
            roi_percent = outputs.roi_percent,
            "Calculation complete"
        );

        Ok(CalculationOutcome {
            allowed: true,
            reason: None,
            severity: Some(outputs.severity()),
            outputs: Some(outputs),
        })
    }
}
