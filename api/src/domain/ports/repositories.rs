//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    MonthKey, NewScenario, Profile, Scenario, ScenarioId, UsageMonthly, UserId,
};
use crate::error::DomainError;

/// Repository for user billing profiles (read-only)
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find the profile for a user, if one exists
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError>;
}

/// Repository for monthly calculation counters
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Get the counter for a user and month
    async fn find(
        &self,
        user_id: &UserId,
        month: &MonthKey,
    ) -> Result<Option<UsageMonthly>, DomainError>;

    /// Atomically add one to the counter unless it has already reached `limit`.
    ///
    /// Creates the row on the first calculation of the month. Returns the new
    /// count, or `None` when the ceiling was hit and nothing was written.
    async fn increment_within_limit(
        &self,
        user_id: &UserId,
        month: &MonthKey,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, DomainError>;
}

/// Repository for saved scenarios
#[async_trait]
pub trait ScenarioRepository: Send + Sync {
    /// Find a scenario owned by the user
    async fn find_by_id(
        &self,
        user_id: &UserId,
        id: &ScenarioId,
    ) -> Result<Option<Scenario>, DomainError>;

    /// List a user's scenarios, most recently updated first
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Scenario>, DomainError>;

    /// Count a user's scenarios
    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, DomainError>;

    /// Insert a scenario unless the user already owns `limit` or more.
    ///
    /// The count and insert happen as one unit per user. `None` limit means
    /// unlimited. Returns `None` when the ceiling was hit.
    async fn create_within_limit(
        &self,
        scenario: &NewScenario,
        limit: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<Option<Scenario>, DomainError>;

    /// Rename a scenario owned by the user. Fails with `NotFound` if no such row.
    async fn rename(
        &self,
        user_id: &UserId,
        id: &ScenarioId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Scenario, DomainError>;

    /// Delete a scenario owned by the user. Fails with `NotFound` if no such row.
    async fn delete(&self, user_id: &UserId, id: &ScenarioId) -> Result<(), DomainError>;
}
