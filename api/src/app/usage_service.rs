//! Usage service
//!
//! Enforces the monthly calculation quota. Free users get a fixed number of
//! calculations per UTC calendar month; pro users are never counted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{AuthUser, MonthKey, Tier, UsageDecision, UserId};
use crate::domain::ports::{ProfileRepository, UsageRepository};
use crate::error::{AppError, DomainError};

/// Reason returned when a free user has used up the month's calculations
pub const MONTHLY_LIMIT_REASON: &str = "Monthly calculation limit reached.";

/// Resolve a user's tier. Users without a profile row are on the free tier.
pub async fn lookup_tier<PR>(profiles: &PR, user_id: &UserId) -> Result<Tier, DomainError>
where
    PR: ProfileRepository + ?Sized,
{
    Ok(profiles
        .find_by_user(user_id)
        .await?
        .map(|p| p.tier())
        .unwrap_or(Tier::Free))
}

/// Calculation usage for the current month
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyUsage {
    pub tier: Tier,
    pub month: MonthKey,
    pub calc_count: i32,
    /// `None` when unlimited
    pub calc_limit: Option<u32>,
    pub remaining: Option<u32>,
}

/// Service for the monthly calculation quota
pub struct UsageService<PR, UR>
where
    PR: ProfileRepository,
    UR: UsageRepository,
{
    profiles: Arc<PR>,
    usage: Arc<UR>,
}

impl<PR, UR> UsageService<PR, UR>
where
    PR: ProfileRepository,
    UR: UsageRepository,
{
    pub fn new(profiles: Arc<PR>, usage: Arc<UR>) -> Self {
        Self { profiles, usage }
    }

    pub async fn tier_for(&self, user: &AuthUser) -> Result<Tier, AppError> {
        Ok(lookup_tier(self.profiles.as_ref(), &user.id).await?)
    }

    /// Count one calculation against the user's quota for the month of
    /// `now`, if there is room.
    pub async fn check_and_increment_at(
        &self,
        user: &AuthUser,
        now: DateTime<Utc>,
    ) -> Result<UsageDecision, AppError> {
        let tier = self.tier_for(user).await?;

        let Some(limit) = tier.max_calcs_per_month() else {
            return Ok(UsageDecision::allowed());
        };

        let month = MonthKey::from_datetime(now);
        match self
            .usage
            .increment_within_limit(&user.id, &month, limit, now)
            .await?
        {
            Some(count) => {
                tracing::debug!(user_id = %user.id, month = %month, count, "Counted calculation");
                Ok(UsageDecision::allowed())
            }
            None => {
                tracing::info!(
                    user_id = %user.id,
                    month = %month,
                    limit,
                    "Monthly calculation limit reached"
                );
                Ok(UsageDecision::denied(MONTHLY_LIMIT_REASON))
            }
        }
    }

    pub async fn monthly_usage(&self, user: &AuthUser) -> Result<MonthlyUsage, AppError> {
        self.monthly_usage_at(user, Utc::now()).await
    }

    pub async fn monthly_usage_at(
        &self,
        user: &AuthUser,
        now: DateTime<Utc>,
    ) -> Result<MonthlyUsage, AppError> {
        let tier = self.tier_for(user).await?;
        let month = MonthKey::from_datetime(now);
        let calc_count = self
            .usage
            .find(&user.id, &month)
            .await?
            .map(|u| u.calc_count)
            .unwrap_or(0);

        let calc_limit = tier.max_calcs_per_month();
        let used = u32::try_from(calc_count).unwrap_or(0);
        let remaining = calc_limit.map(|limit| limit.saturating_sub(used));

        Ok(MonthlyUsage {
            tier,
            month,
            calc_count,
            calc_limit,
            remaining,
        })
    }
}
