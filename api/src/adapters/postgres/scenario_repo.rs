//! PostgreSQL adapter for ScenarioRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::entities::{NewScenario, Scenario, ScenarioId, UserId};
use crate::domain::ports::ScenarioRepository;
use crate::entity::scenarios;
use crate::error::DomainError;

/// PostgreSQL implementation of ScenarioRepository
pub struct PostgresScenarioRepository {
    db: DatabaseConnection,
}

impl PostgresScenarioRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

#[async_trait]
impl ScenarioRepository for PostgresScenarioRepository {
    async fn find_by_id(
        &self,
        user_id: &UserId,
        id: &ScenarioId,
    ) -> Result<Option<Scenario>, DomainError> {
        let result = scenarios::Entity::find_by_id(id.0)
            .filter(scenarios::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        result.map(Scenario::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Scenario>, DomainError> {
        let results = scenarios::Entity::find()
            .filter(scenarios::Column::UserId.eq(user_id.0))
            .order_by_desc(scenarios::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        results.into_iter().map(Scenario::try_from).collect()
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        scenarios::Entity::find()
            .filter(scenarios::Column::UserId.eq(user_id.0))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn create_within_limit(
        &self,
        scenario: &NewScenario,
        limit: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<Option<Scenario>, DomainError> {
        let inputs_json = serde_json::to_value(scenario.inputs)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let outputs_json = serde_json::to_value(scenario.outputs)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(limit) = limit {
            // Serialize count-then-insert per user for the rest of the transaction
            let lock = Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT pg_advisory_xact_lock(hashtext($1))",
                [scenario.user_id.to_string().into()],
            );
            txn.execute(lock).await.map_err(db_err)?;

            let existing = scenarios::Entity::find()
                .filter(scenarios::Column::UserId.eq(scenario.user_id.0))
                .count(&txn)
                .await
                .map_err(db_err)?;

            if existing >= limit {
                txn.rollback().await.map_err(db_err)?;
                return Ok(None);
            }
        }

        let model = scenarios::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(scenario.user_id.0),
            name: Set(scenario.name.clone()),
            inputs_json: Set(inputs_json),
            outputs_json: Set(outputs_json),
            updated_at: Set(now.fixed_offset()),
        };

        let result = model.insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        Scenario::try_from(result).map(Some)
    }

    async fn rename(
        &self,
        user_id: &UserId,
        id: &ScenarioId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Scenario, DomainError> {
        let result = scenarios::Entity::update_many()
            .col_expr(scenarios::Column::Name, Expr::value(name.to_string()))
            .col_expr(scenarios::Column::UpdatedAt, Expr::value(now.fixed_offset()))
            .filter(scenarios::Column::Id.eq(id.0))
            .filter(scenarios::Column::UserId.eq(user_id.0))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Scenario {} not found", id)));
        }

        self.find_by_id(user_id, id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Scenario {} not found", id)))
    }

    async fn delete(&self, user_id: &UserId, id: &ScenarioId) -> Result<(), DomainError> {
        let result = scenarios::Entity::delete_many()
            .filter(scenarios::Column::Id.eq(id.0))
            .filter(scenarios::Column::UserId.eq(user_id.0))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Scenario {} not found", id)));
        }

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<scenarios::Model> for Scenario {
    type Error = DomainError;

    fn try_from(model: scenarios::Model) -> Result<Self, Self::Error> {
        let inputs = serde_json::from_value(model.inputs_json).map_err(|e| {
            DomainError::Database(format!("Scenario {} has invalid inputs: {}", model.id, e))
        })?;
        let outputs = serde_json::from_value(model.outputs_json).map_err(|e| {
            DomainError::Database(format!("Scenario {} has invalid outputs: {}", model.id, e))
        })?;

        Ok(Scenario {
            id: ScenarioId(model.id),
            user_id: UserId(model.user_id),
            name: model.name,
            inputs,
            outputs,
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}
