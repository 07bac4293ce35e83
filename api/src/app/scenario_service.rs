//! Scenario service
//!
//! Saving, listing, renaming and deleting a user's saved calculations.
//! Every operation is scoped to the calling user; other users' scenarios
//! behave as if they do not exist.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use super::usage_service::lookup_tier;
use crate::domain::entities::{
    calculate, default_scenario_name, AuthUser, CalculatorInputs, CalculatorOutputs, NewScenario,
    SaveOutcome, Scenario, ScenarioId, MAX_SCENARIO_NAME_LEN,
};
use crate::domain::ports::{ProfileRepository, ScenarioRepository};
use crate::error::{AppError, DomainError};

/// How many scenarios a user holds against their ceiling
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioQuota {
    pub count: u64,
    /// `None` when unlimited
    pub limit: Option<u64>,
}

fn limit_reason(limit: u64) -> String {
    format!("Scenario limit reached ({} total).", limit)
}

/// Trim a name and enforce the length ceiling. Returns `None` for blank names.
fn normalize_name(name: &str) -> Result<Option<String>, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_SCENARIO_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "Scenario name must be at most {} characters",
            MAX_SCENARIO_NAME_LEN
        )));
    }
    Ok(Some(trimmed.to_string()))
}

pub struct ScenarioService<PR, SR>
where
    PR: ProfileRepository,
    SR: ScenarioRepository,
{
    profiles: Arc<PR>,
    scenarios: Arc<SR>,
}

impl<PR, SR> ScenarioService<PR, SR>
where
    PR: ProfileRepository,
    SR: ScenarioRepository,
{
    pub fn new(profiles: Arc<PR>, scenarios: Arc<SR>) -> Self {
        Self {
            profiles,
            scenarios,
        }
    }

    /// Save a calculation under a name, subject to the scenario ceiling.
    ///
    /// A blank name gets a timestamped default. Missing outputs are computed
    /// from the inputs. Hitting the ceiling is reported in the outcome.
    pub async fn save(
        &self,
        user: &AuthUser,
        name: &str,
        inputs: CalculatorInputs,
        outputs: Option<CalculatorOutputs>,
    ) -> Result<SaveOutcome, AppError> {
        self.save_at(user, name, inputs, outputs, Utc::now()).await
    }

    pub async fn save_at(
        &self,
        user: &AuthUser,
        name: &str,
        inputs: CalculatorInputs,
        outputs: Option<CalculatorOutputs>,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, AppError> {
        let name = match normalize_name(name)? {
            Some(name) => name,
            None => default_scenario_name(now.with_timezone(&Local).naive_local()),
        };

        let tier = lookup_tier(self.profiles.as_ref(), &user.id).await?;
        let limit = tier.max_scenarios();

        let new_scenario = NewScenario {
            user_id: user.id,
            name,
            inputs,
            outputs: outputs.unwrap_or_else(|| calculate(&inputs)),
        };

        match self
            .scenarios
            .create_within_limit(&new_scenario, limit, now)
            .await?
        {
            Some(scenario) => {
                tracing::info!(
                    user_id = %user.id,
                    scenario_id = %scenario.id,
                    name = %scenario.name,
                    "Saved scenario"
                );
                Ok(SaveOutcome::saved(scenario))
            }
            None => {
                let limit = limit.unwrap_or_default();
                tracing::info!(user_id = %user.id, limit, "Scenario limit reached");
                Ok(SaveOutcome::rejected(limit_reason(limit)))
            }
        }
    }

    /// List the user's scenarios, most recently updated first.
    ///
    /// `search` filters by case-insensitive name substring; blank means no filter.
    pub async fn list(
        &self,
        user: &AuthUser,
        search: Option<&str>,
    ) -> Result<Vec<Scenario>, AppError> {
        let scenarios = self.scenarios.list_by_user(&user.id).await?;

        let needle = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(match needle {
            Some(needle) => scenarios
                .into_iter()
                .filter(|s| s.name_matches(needle))
                .collect(),
            None => scenarios,
        })
    }

    pub async fn get(&self, user: &AuthUser, id: &ScenarioId) -> Result<Scenario, AppError> {
        self.scenarios
            .find_by_id(&user.id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Scenario {} not found", id)))
    }

    /// Rename a scenario. Blank names are rejected.
    pub async fn rename(
        &self,
        user: &AuthUser,
        id: &ScenarioId,
        name: &str,
    ) -> Result<Scenario, AppError> {
        self.rename_at(user, id, name, Utc::now()).await
    }

    pub async fn rename_at(
        &self,
        user: &AuthUser,
        id: &ScenarioId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Scenario, AppError> {
        let name = normalize_name(name)?.ok_or_else(|| {
            DomainError::Validation("Scenario name must not be blank".to_string())
        })?;

        let scenario = self.scenarios.rename(&user.id, id, &name, now).await?;
        tracing::info!(user_id = %user.id, scenario_id = %id, name = %name, "Renamed scenario");
        Ok(scenario)
    }

    pub async fn delete(&self, user: &AuthUser, id: &ScenarioId) -> Result<(), AppError> {
        self.scenarios.delete(&user.id, id).await?;
        tracing::info!(user_id = %user.id, scenario_id = %id, "Deleted scenario");
        Ok(())
    }

    pub async fn quota(&self, user: &AuthUser) -> Result<ScenarioQuota, AppError> {
        let tier = lookup_tier(self.profiles.as_ref(), &user.id).await?;
        let count = self.scenarios.count_by_user(&user.id).await?;
        Ok(ScenarioQuota {
            count,
            limit: tier.max_scenarios(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        test_inputs, test_pro_profile, test_scenario, test_user, InMemoryProfileRepository,
        InMemoryScenarioRepository,
    };
    use chrono::Duration;

    type TestService = ScenarioService<InMemoryProfileRepository, InMemoryScenarioRepository>;

    fn create_service(
        profiles: InMemoryProfileRepository,
        scenarios: InMemoryScenarioRepository,
    ) -> (TestService, Arc<InMemoryScenarioRepository>) {
        let scenarios = Arc::new(scenarios);
        (
            ScenarioService::new(Arc::new(profiles), scenarios.clone()),
            scenarios,
        )
    }

    fn with_scenarios(user: &AuthUser, n: usize) -> InMemoryScenarioRepository {
        (0..n).fold(InMemoryScenarioRepository::new(), |repo, i| {
            repo.with_scenario(test_scenario(user.id, &format!("Scenario {}", i)))
        })
    }

    #[tokio::test]
    async fn save_under_limit() {
        let user = test_user();
        let (service, repo) =
            create_service(InMemoryProfileRepository::new(), with_scenarios(&user, 4));

        let outcome = service
            .save(&user, "Garlic press", test_inputs(), None)
            .await
            .unwrap();

        assert!(outcome.success);
        let scenario = outcome.scenario.unwrap();
        assert_eq!(scenario.name, "Garlic press");
        assert_eq!(scenario.outputs, calculate(&test_inputs()));
        assert_eq!(repo.len(), 5);
    }

    #[tokio::test]
    async fn sixth_scenario_is_rejected() {
        let user = test_user();
        let (service, repo) =
            create_service(InMemoryProfileRepository::new(), with_scenarios(&user, 5));

        let outcome = service
            .save(&user, "One too many", test_inputs(), None)
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(
            outcome.reason.as_deref(),
            Some("Scenario limit reached (5 total).")
        );
        assert_eq!(repo.len(), 5);
    }

    #[tokio::test]
    async fn delete_frees_a_slot() {
        let user = test_user();
        let (service, _) =
            create_service(InMemoryProfileRepository::new(), with_scenarios(&user, 5));

        assert!(!service.save(&user, "x", test_inputs(), None).await.unwrap().success);

        let oldest = service.list(&user, None).await.unwrap().pop().unwrap();
        service.delete(&user, &oldest.id).await.unwrap();

        assert!(service.save(&user, "x", test_inputs(), None).await.unwrap().success);
    }

    #[tokio::test]
    async fn pro_user_has_no_ceiling() {
        let user = test_user();
        let (service, repo) = create_service(
            InMemoryProfileRepository::new().with_profile(test_pro_profile(user.id)),
            with_scenarios(&user, 12),
        );

        let outcome = service.save(&user, "More", test_inputs(), None).await.unwrap();

        assert!(outcome.success);
        assert_eq!(repo.len(), 13);
    }

    #[tokio::test]
    async fn blank_name_gets_timestamped_default() {
        let user = test_user();
        let (service, _) = create_service(
            InMemoryProfileRepository::new(),
            InMemoryScenarioRepository::new(),
        );

        let outcome = service.save(&user, "   ", test_inputs(), None).await.unwrap();

        let name = outcome.scenario.unwrap().name;
        let pattern = regex::Regex::new(r"^Scenario \d{4}-\d{2}-\d{2} \d{2}:\d{2}$").unwrap();
        assert!(pattern.is_match(&name), "unexpected default name: {}", name);
    }

    #[tokio::test]
    async fn name_is_trimmed_and_length_checked() {
        let user = test_user();
        let (service, _) = create_service(
            InMemoryProfileRepository::new(),
            InMemoryScenarioRepository::new(),
        );

        let outcome = service
            .save(&user, "  Kettle  ", test_inputs(), None)
            .await
            .unwrap();
        assert_eq!(outcome.scenario.unwrap().name, "Kettle");

        let too_long = "x".repeat(MAX_SCENARIO_NAME_LEN + 1);
        let result = service.save(&user, &too_long, test_inputs(), None).await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn provided_outputs_are_kept() {
        let user = test_user();
        let (service, _) = create_service(
            InMemoryProfileRepository::new(),
            InMemoryScenarioRepository::new(),
        );
        let mut outputs = calculate(&test_inputs());
        outputs.net_profit = 1.0;

        let outcome = service
            .save(&user, "Custom", test_inputs(), Some(outputs))
            .await
            .unwrap();

        assert_eq!(outcome.scenario.unwrap().outputs.net_profit, 1.0);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_searchable() {
        let user = test_user();
        let (service, _) = create_service(
            InMemoryProfileRepository::new(),
            InMemoryScenarioRepository::new(),
        );
        let start = Utc::now();
        for (i, name) in ["Blender", "Garlic press", "Garlic crusher"].iter().enumerate() {
            service
                .save_at(&user, name, test_inputs(), None, start + Duration::seconds(i as i64))
                .await
                .unwrap();
        }

        let all = service.list(&user, None).await.unwrap();
        let names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Garlic crusher", "Garlic press", "Blender"]);

        let garlic = service.list(&user, Some("GARLIC")).await.unwrap();
        assert_eq!(garlic.len(), 2);

        let blank = service.list(&user, Some("  ")).await.unwrap();
        assert_eq!(blank.len(), 3);
    }

    #[tokio::test]
    async fn rename_moves_scenario_to_top() {
        let user = test_user();
        let (service, _) = create_service(
            InMemoryProfileRepository::new(),
            InMemoryScenarioRepository::new(),
        );
        let start = Utc::now();
        let first = service
            .save_at(&user, "first", test_inputs(), None, start)
            .await
            .unwrap()
            .scenario
            .unwrap();
        service
            .save_at(&user, "second", test_inputs(), None, start + Duration::seconds(1))
            .await
            .unwrap();

        let renamed = service
            .rename_at(&user, &first.id, " renamed ", start + Duration::seconds(2))
            .await
            .unwrap();

        assert_eq!(renamed.name, "renamed");
        assert_eq!(service.list(&user, None).await.unwrap()[0].id, first.id);
    }

    #[tokio::test]
    async fn rename_to_blank_is_rejected() {
        let user = test_user();
        let scenario = test_scenario(user.id, "keep me");
        let id = scenario.id;
        let (service, repo) = create_service(
            InMemoryProfileRepository::new(),
            InMemoryScenarioRepository::new().with_scenario(scenario),
        );

        let result = service.rename(&user, &id, "   ").await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::Validation(_)))
        ));
        assert_eq!(repo.get(&id).unwrap().name, "keep me");
    }

    #[tokio::test]
    async fn other_users_scenario_is_not_found() {
        let owner = test_user();
        let stranger = test_user();
        let scenario = test_scenario(owner.id, "private");
        let id = scenario.id;
        let (service, repo) = create_service(
            InMemoryProfileRepository::new(),
            InMemoryScenarioRepository::new().with_scenario(scenario),
        );

        assert!(matches!(
            service.get(&stranger, &id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.rename(&stranger, &id, "mine now").await,
            Err(AppError::Domain(DomainError::NotFound(_)))
        ));
        assert!(matches!(
            service.delete(&stranger, &id).await,
            Err(AppError::Domain(DomainError::NotFound(_)))
        ));
        assert!(service.list(&stranger, None).await.unwrap().is_empty());
        assert_eq!(repo.get(&id).unwrap().name, "private");
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let user = test_user();
        let (service, _) = create_service(
            InMemoryProfileRepository::new(),
            InMemoryScenarioRepository::new(),
        );

        let result = service.delete(&user, &ScenarioId::new()).await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn quota_reports_count_and_limit() {
        let user = test_user();
        let (service, _) =
            create_service(InMemoryProfileRepository::new(), with_scenarios(&user, 3));

        let quota = service.quota(&user).await.unwrap();

        assert_eq!(quota.count, 3);
        assert_eq!(quota.limit, Some(5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_respect_limit() {
        let user = test_user();
        let (service, repo) = create_service(
            InMemoryProfileRepository::new(),
            InMemoryScenarioRepository::new(),
        );
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for i in 0..12 {
            let service = service.clone();
            let user = user.clone();
            handles.push(tokio::spawn(async move {
                service
                    .save(&user, &format!("s{}", i), test_inputs(), None)
                    .await
                    .unwrap()
            }));
        }

        let mut saved = 0;
        for handle in handles {
            if handle.await.unwrap().success {
                saved += 1;
            }
        }

        assert_eq!(saved, 5);
        assert_eq!(repo.len(), 5);
    }
}
