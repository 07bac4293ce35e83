//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    AuthSession, AuthUser, MonthKey, NewScenario, Profile, Scenario, ScenarioId, UsageMonthly,
    UserId,
};
use crate::domain::ports::{
    IdentityProvider, ProfileRepository, ScenarioRepository, UsageRepository,
};
use crate::error::{DomainError, IdentityError};

// ============================================================================
// In-Memory Profile Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<RwLock<HashMap<UserId, Profile>>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a profile for testing
    pub fn with_profile(self, profile: Profile) -> Self {
        self.profiles
            .write()
            .unwrap()
            .insert(profile.user_id, profile);
        self
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError> {
        Ok(self.profiles.read().unwrap().get(user_id).cloned())
    }
}

// ============================================================================
// In-Memory Usage Repository
// ============================================================================

type UsageKey = (UserId, String);

#[derive(Default)]
pub struct InMemoryUsageRepository {
    rows: Arc<RwLock<HashMap<UsageKey, UsageMonthly>>>,
    should_fail: bool,
}

impl InMemoryUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a database error
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Pre-populate a counter for testing
    pub fn with_count(self, user_id: UserId, month: &str, calc_count: i32) -> Self {
        let month: MonthKey = month.parse().unwrap();
        self.rows.write().unwrap().insert(
            (user_id, month.as_str().to_string()),
            UsageMonthly {
                user_id,
                month,
                calc_count,
                updated_at: Utc::now(),
            },
        );
        self
    }

    /// Current counter value, `None` if no row exists
    pub fn count_for(&self, user_id: &UserId, month: &str) -> Option<i32> {
        self.rows
            .read()
            .unwrap()
            .get(&(*user_id, month.to_string()))
            .map(|row| row.calc_count)
    }

    fn check_fail(&self) -> Result<(), DomainError> {
        if self.should_fail {
            return Err(DomainError::Database("Mock failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UsageRepository for InMemoryUsageRepository {
    async fn find(
        &self,
        user_id: &UserId,
        month: &MonthKey,
    ) -> Result<Option<UsageMonthly>, DomainError> {
        self.check_fail()?;
        Ok(self
            .rows
            .read()
            .unwrap()
            .get(&(*user_id, month.as_str().to_string()))
            .cloned())
    }

    async fn increment_within_limit(
        &self,
        user_id: &UserId,
        month: &MonthKey,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, DomainError> {
        self.check_fail()?;

        // Check and write under one lock, like the conditional upsert
        let mut rows = self.rows.write().unwrap();
        let row = rows
            .entry((*user_id, month.as_str().to_string()))
            .or_insert_with(|| UsageMonthly {
                user_id: *user_id,
                month: month.clone(),
                calc_count: 0,
                updated_at: now,
            });

        if i64::from(row.calc_count) >= i64::from(limit) {
            return Ok(None);
        }

        row.calc_count += 1;
        row.updated_at = now;
        Ok(Some(row.calc_count))
    }
}

// ============================================================================
// In-Memory Scenario Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryScenarioRepository {
    scenarios: Arc<RwLock<HashMap<ScenarioId, Scenario>>>,
}

impl InMemoryScenarioRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a scenario for testing
    pub fn with_scenario(self, scenario: Scenario) -> Self {
        self.scenarios
            .write()
            .unwrap()
            .insert(scenario.id, scenario);
        self
    }

    /// Total scenarios across all users
    pub fn len(&self) -> usize {
        self.scenarios.read().unwrap().len()
    }

    /// Look up a scenario regardless of owner
    pub fn get(&self, id: &ScenarioId) -> Option<Scenario> {
        self.scenarios.read().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl ScenarioRepository for InMemoryScenarioRepository {
    async fn find_by_id(
        &self,
        user_id: &UserId,
        id: &ScenarioId,
    ) -> Result<Option<Scenario>, DomainError> {
        Ok(self
            .scenarios
            .read()
            .unwrap()
            .get(id)
            .filter(|s| s.user_id == *user_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Scenario>, DomainError> {
        let mut result: Vec<_> = self
            .scenarios
            .read()
            .unwrap()
            .values()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(result)
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        Ok(self
            .scenarios
            .read()
            .unwrap()
            .values()
            .filter(|s| s.user_id == *user_id)
            .count() as u64)
    }

    async fn create_within_limit(
        &self,
        scenario: &NewScenario,
        limit: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<Option<Scenario>, DomainError> {
        let mut scenarios = self.scenarios.write().unwrap();

        if let Some(limit) = limit {
            let existing = scenarios
                .values()
                .filter(|s| s.user_id == scenario.user_id)
                .count() as u64;
            if existing >= limit {
                return Ok(None);
            }
        }

        let created = Scenario {
            id: ScenarioId::new(),
            user_id: scenario.user_id,
            name: scenario.name.clone(),
            inputs: scenario.inputs,
            outputs: scenario.outputs,
            updated_at: now,
        };
        scenarios.insert(created.id, created.clone());
        Ok(Some(created))
    }

    async fn rename(
        &self,
        user_id: &UserId,
        id: &ScenarioId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Scenario, DomainError> {
        let mut scenarios = self.scenarios.write().unwrap();
        let scenario = scenarios
            .get_mut(id)
            .filter(|s| s.user_id == *user_id)
            .ok_or_else(|| DomainError::NotFound(format!("Scenario {} not found", id)))?;

        scenario.name = name.to_string();
        scenario.updated_at = now;
        Ok(scenario.clone())
    }

    async fn delete(&self, user_id: &UserId, id: &ScenarioId) -> Result<(), DomainError> {
        let mut scenarios = self.scenarios.write().unwrap();
        match scenarios.get(id) {
            Some(s) if s.user_id == *user_id => {
                scenarios.remove(id);
                Ok(())
            }
            _ => Err(DomainError::NotFound(format!("Scenario {} not found", id))),
        }
    }
}

// ============================================================================
// Mock Identity Provider
// ============================================================================

/// A magic link request captured by the mock
#[derive(Debug, Clone)]
pub struct SentLink {
    pub email: String,
    pub redirect_to: String,
    pub code_challenge: String,
}

/// A mock identity provider with configurable tokens and sign-in codes
#[derive(Default)]
pub struct MockIdentityProvider {
    pub should_fail: bool,
    tokens: Arc<RwLock<HashMap<String, AuthUser>>>,
    /// code -> (verifier, user)
    codes: Arc<RwLock<HashMap<String, (String, AuthUser)>>>,
    sent: Arc<RwLock<Vec<SentLink>>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Accept `token` as an access token for `user`
    pub fn with_user(self, token: &str, user: AuthUser) -> Self {
        self.tokens
            .write()
            .unwrap()
            .insert(token.to_string(), user);
        self
    }

    /// Accept `code` when presented with `verifier`
    pub fn with_code(self, code: &str, verifier: &str, user: AuthUser) -> Self {
        self.codes
            .write()
            .unwrap()
            .insert(code.to_string(), (verifier.to_string(), user));
        self
    }

    pub fn sent_links(&self) -> Vec<SentLink> {
        self.sent.read().unwrap().clone()
    }

    fn check_fail(&self) -> Result<(), IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Api {
                status: 500,
                message: "Mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, IdentityError> {
        self.check_fail()?;
        Ok(self.tokens.read().unwrap().get(access_token).cloned())
    }

    async fn request_magic_link(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), IdentityError> {
        self.check_fail()?;
        self.sent.write().unwrap().push(SentLink {
            email: email.to_string(),
            redirect_to: redirect_to.to_string(),
            code_challenge: code_challenge.to_string(),
        });
        Ok(())
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, IdentityError> {
        self.check_fail()?;

        let (verifier, user) = self
            .codes
            .write()
            .unwrap()
            .remove(code)
            .ok_or_else(|| IdentityError::Api {
                status: 400,
                message: "Invalid or expired code".to_string(),
            })?;

        if verifier != code_verifier {
            return Err(IdentityError::Api {
                status: 400,
                message: "code challenge does not match previously saved code verifier"
                    .to_string(),
            });
        }

        let access_token = format!("access-{}", user.id);
        self.tokens
            .write()
            .unwrap()
            .insert(access_token.clone(), user.clone());

        Ok(AuthSession {
            access_token,
            refresh_token: format!("refresh-{}", user.id),
            expires_in: 3600,
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.check_fail()?;
        self.tokens
            .write()
            .unwrap()
            .remove(access_token)
            .map(|_| ())
            .ok_or(IdentityError::Unauthorized)
    }
}
